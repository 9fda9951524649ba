use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::{decode, section};
use crate::{
    error::WeatherError,
    model::{CurrentWeather, ForecastDay, WeatherReport},
    units::UnitSystem,
};

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

// Unit-independent part of `current`.
#[derive(Debug, Deserialize)]
struct WaCurrent {
    humidity: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaCurrentMetric {
    temp_c: f64,
    pressure_mb: f64,
    precip_mm: f64,
    wind_kph: f64,
}

#[derive(Debug, Deserialize)]
struct WaCurrentImperial {
    temp_f: f64,
    pressure_in: f64,
    precip_in: f64,
    wind_mph: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: Value,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaDayMetric {
    maxtemp_c: f64,
    mintemp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaDayImperial {
    maxtemp_f: f64,
    mintemp_f: f64,
}

/// Current conditions from a forecast.json document.
///
/// Only the field group for `unit` is decoded; the other system's fields may
/// be absent or malformed without affecting the result.
pub fn parse_current(payload: &Value, unit: UnitSystem) -> Result<CurrentWeather, WeatherError> {
    let current = section(payload, "current")?;
    let common: WaCurrent = decode(current, "current")?;

    let (temperature, pressure, precipitation, wind_speed) = match unit {
        UnitSystem::Metric => {
            let m: WaCurrentMetric = decode(current, "current (metric)")?;
            (m.temp_c, m.pressure_mb, m.precip_mm, m.wind_kph)
        }
        UnitSystem::Imperial => {
            let i: WaCurrentImperial = decode(current, "current (imperial)")?;
            (i.temp_f, i.pressure_in, i.precip_in, i.wind_mph)
        }
    };

    Ok(CurrentWeather {
        temperature,
        condition: common.condition.text,
        icon_url: common.condition.icon,
        humidity: common.humidity,
        pressure,
        precipitation,
        wind_speed,
    })
}

/// One [`ForecastDay`] per `forecast.forecastday` entry, in payload order.
pub fn parse_forecast(payload: &Value, unit: UnitSystem) -> Result<Vec<ForecastDay>, WeatherError> {
    let forecast: WaForecast = decode(section(payload, "forecast")?, "forecast")?;

    forecast
        .forecastday
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let what = format!("forecast.forecastday[{idx}].day");
            let day: WaDay = decode(&entry.day, &what)?;

            let (max_temp, min_temp) = match unit {
                UnitSystem::Metric => {
                    let m: WaDayMetric = decode(&entry.day, &what)?;
                    (m.maxtemp_c, m.mintemp_c)
                }
                UnitSystem::Imperial => {
                    let i: WaDayImperial = decode(&entry.day, &what)?;
                    (i.maxtemp_f, i.mintemp_f)
                }
            };

            Ok(ForecastDay {
                date: entry.date,
                max_temp,
                min_temp,
                condition: day.condition.text,
                icon_url: day.condition.icon,
            })
        })
        .collect()
}

/// Current conditions and forecast, both under `unit`.
pub fn parse_weather(payload: &Value, unit: UnitSystem) -> Result<WeatherReport, WeatherError> {
    Ok(WeatherReport {
        unit,
        current: parse_current(payload, unit)?,
        forecast: parse_forecast(payload, unit)?,
    })
}

pub fn parse_weather_body(body: &str, unit: UnitSystem) -> Result<WeatherReport, WeatherError> {
    let payload: Value =
        serde_json::from_str(body).map_err(|err| WeatherError::malformed("weather body", err))?;
    parse_weather(&payload, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(text: &str) -> Value {
        json!({
            "text": text,
            "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png",
            "code": 1000
        })
    }

    fn payload() -> Value {
        json!({
            "location": { "name": "Worcester", "localtime": "2024-10-16 9:05" },
            "current": {
                "temp_c": 12.2, "temp_f": 54.0,
                "pressure_mb": 1021.0, "pressure_in": 30.15,
                "precip_mm": 0.3, "precip_in": 0.01,
                "wind_kph": 15.1, "wind_mph": 9.4,
                "humidity": 72,
                "condition": condition("Partly cloudy")
            },
            "forecast": {
                "forecastday": [
                    { "date": "2024-10-16", "day": {
                        "maxtemp_c": 15.0, "maxtemp_f": 59.0, "mintemp_c": 6.1, "mintemp_f": 43.0,
                        "condition": condition("Sunny") } },
                    { "date": "2024-10-17", "day": {
                        "maxtemp_c": 11.3, "maxtemp_f": 52.3, "mintemp_c": 4.0, "mintemp_f": 39.2,
                        "condition": condition("Overcast") } },
                    { "date": "2024-10-18", "day": {
                        "maxtemp_c": 9.0, "maxtemp_f": 48.2, "mintemp_c": 2.2, "mintemp_f": 36.0,
                        "condition": condition("Rain") } }
                ]
            }
        })
    }

    fn strip(doc: &mut Value, pointer: &str, keys: &[&str]) {
        let obj = doc.pointer_mut(pointer).and_then(Value::as_object_mut).unwrap();
        for key in keys {
            obj.remove(*key);
        }
    }

    #[test]
    fn metric_current_reads_metric_fields() {
        let current = parse_current(&payload(), UnitSystem::Metric).unwrap();

        assert_eq!(current.temperature, 12.2);
        assert_eq!(current.pressure, 1021.0);
        assert_eq!(current.precipitation, 0.3);
        assert_eq!(current.wind_speed, 15.1);
        assert_eq!(current.humidity, 72.0);
        assert_eq!(current.condition, "Partly cloudy");
        assert_eq!(current.icon_url, "//cdn.weatherapi.com/weather/64x64/day/113.png");
    }

    #[test]
    fn imperial_current_reads_imperial_fields() {
        let current = parse_current(&payload(), UnitSystem::Imperial).unwrap();

        assert_eq!(current.temperature, 54.0);
        assert_eq!(current.pressure, 30.15);
        assert_eq!(current.precipitation, 0.01);
        assert_eq!(current.wind_speed, 9.4);
    }

    #[test]
    fn metric_never_touches_imperial_fields() {
        let mut doc = payload();
        strip(&mut doc, "/current", &["temp_f", "pressure_in", "precip_in"]);
        doc["current"]["wind_mph"] = json!("not a number");
        for idx in 0..3 {
            let day = format!("/forecast/forecastday/{idx}/day");
            strip(&mut doc, &day, &["maxtemp_f", "mintemp_f"]);
        }

        let report = parse_weather(&doc, UnitSystem::Metric).unwrap();
        assert_eq!(report.unit, UnitSystem::Metric);
        assert_eq!(report.current.temperature, 12.2);
        assert_eq!(report.forecast[0].max_temp, 15.0);
    }

    #[test]
    fn imperial_never_touches_metric_fields() {
        let mut doc = payload();
        strip(&mut doc, "/current", &["temp_c", "pressure_mb", "precip_mm", "wind_kph"]);
        for idx in 0..3 {
            let day = format!("/forecast/forecastday/{idx}/day");
            strip(&mut doc, &day, &["maxtemp_c", "mintemp_c"]);
        }

        let report = parse_weather(&doc, UnitSystem::Imperial).unwrap();
        assert_eq!(report.current.temperature, 54.0);
        assert_eq!(report.forecast[2].min_temp, 36.0);
    }

    #[test]
    fn missing_temp_c_under_metric_is_malformed() {
        let mut doc = payload();
        strip(&mut doc, "/current", &["temp_c"]);

        let err = parse_current(&doc, UnitSystem::Metric).unwrap_err();
        match err {
            WeatherError::MalformedResponse(msg) => assert!(msg.contains("temp_c"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }

        // The imperial reading of the same document is still fine.
        assert!(parse_current(&doc, UnitSystem::Imperial).is_ok());
    }

    #[test]
    fn mistyped_shared_field_is_malformed() {
        let mut doc = payload();
        doc["current"]["condition"] = json!("Sunny");

        let err = parse_current(&doc, UnitSystem::Imperial).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn missing_sections_are_malformed() {
        let err = parse_current(&json!({}), UnitSystem::Metric).unwrap_err();
        assert_eq!(err, WeatherError::MalformedResponse("missing `current` section".into()));

        let err = parse_forecast(&json!({ "current": {} }), UnitSystem::Metric).unwrap_err();
        assert_eq!(err, WeatherError::MalformedResponse("missing `forecast` section".into()));
    }

    #[test]
    fn forecast_preserves_order_and_length() {
        let doc = payload();
        let days = parse_forecast(&doc, UnitSystem::Imperial).unwrap();
        let input = doc["forecast"]["forecastday"].as_array().unwrap();

        assert_eq!(days.len(), input.len());
        for (day, raw) in days.iter().zip(input) {
            assert_eq!(day.date.to_string(), raw["date"].as_str().unwrap());
        }
        assert_eq!(
            days.iter().map(|d| d.condition.as_str()).collect::<Vec<_>>(),
            ["Sunny", "Overcast", "Rain"]
        );
    }

    #[test]
    fn forecast_keeps_payload_order_even_when_not_chronological() {
        let mut doc = payload();
        doc["forecast"]["forecastday"].as_array_mut().unwrap().reverse();

        let days = parse_forecast(&doc, UnitSystem::Metric).unwrap();
        let dates: Vec<String> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2024-10-18", "2024-10-17", "2024-10-16"]);
    }

    #[test]
    fn empty_forecast_is_empty() {
        let mut doc = payload();
        doc["forecast"]["forecastday"] = json!([]);

        assert!(parse_forecast(&doc, UnitSystem::Metric).unwrap().is_empty());
    }

    #[test]
    fn forecast_error_names_the_day() {
        let mut doc = payload();
        strip(&mut doc, "/forecast/forecastday/1/day", &["mintemp_f"]);

        let err = parse_forecast(&doc, UnitSystem::Imperial).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("forecastday[1]"), "{msg}");
        assert!(msg.contains("mintemp_f"), "{msg}");
    }

    #[test]
    fn body_that_is_not_json_is_malformed() {
        let err = parse_weather_body("<html>502</html>", UnitSystem::Metric).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));

        let report = parse_weather_body(&payload().to_string(), UnitSystem::Metric).unwrap();
        assert_eq!(report.forecast.len(), 3);
    }
}
