use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use super::decode;
use crate::{error::WeatherError, model::LocationDetails};

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaAstronomy {
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaAstronomyResponse {
    astronomy: WaAstronomy,
    location: WaLocation,
}

/// Sunrise, sunset and local calendar date from an astronomy.json document.
pub fn parse_astronomy(payload: &Value) -> Result<LocationDetails, WeatherError> {
    let parsed: WaAstronomyResponse = decode(payload, "astronomy")?;

    Ok(LocationDetails {
        sunrise: parse_clock(&parsed.astronomy.astro.sunrise)?,
        sunset: parse_clock(&parsed.astronomy.astro.sunset)?,
        local_date: parse_local_date(&parsed.location.localtime)?,
    })
}

/// Rewrites `"6:15a"`, `"6:15 pm"` or `"06:15 AM"` as `"06:15 AM"`.
///
/// Returns `None` unless the input is exactly `H:MM` or `HH:MM` followed by a
/// meridiem marker.
fn normalize_meridiem(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let split = trimmed.find(|c: char| c.is_ascii_alphabetic())?;
    let (clock, marker) = trimmed.split_at(split);

    let meridiem = match marker.to_ascii_lowercase().as_str() {
        "a" | "am" => "AM",
        "p" | "pm" => "PM",
        _ => return None,
    };

    let (hour, minute) = clock.trim_end().split_once(':')?;
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !(1..=2).contains(&hour.len()) || minute.len() != 2 || !digits(hour) || !digits(minute) {
        return None;
    }

    Some(format!("{hour:0>2}:{minute} {meridiem}"))
}

fn parse_clock(raw: &str) -> Result<NaiveTime, WeatherError> {
    let normalized = normalize_meridiem(raw).ok_or_else(|| {
        WeatherError::MalformedResponse(format!("unrecognised clock time `{raw}`"))
    })?;

    NaiveTime::parse_from_str(&normalized, "%I:%M %p")
        .map_err(|err| WeatherError::malformed(format!("clock time `{raw}`"), err))
}

// `localtime` looks like "2024-10-16 9:5"; hour and minute are not zero-padded.
fn parse_local_date(raw: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M")
        .map(|dt| dt.date())
        .map_err(|err| WeatherError::malformed(format!("local time `{raw}`"), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(sunrise: &str, sunset: &str, localtime: &str) -> Value {
        json!({
            "location": { "name": "Worcester", "localtime": localtime },
            "astronomy": { "astro": {
                "sunrise": sunrise, "sunset": sunset,
                "moonrise": "03:12 PM", "moon_phase": "Waxing Gibbous"
            } }
        })
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn single_letter_meridiem() {
        let details = parse_astronomy(&payload("6:15a", "6:15p", "2024-10-16 9:5")).unwrap();

        assert_eq!(details.sunrise, hm(6, 15));
        assert_eq!(details.sunset, hm(18, 15));
        assert_eq!(details.local_date, NaiveDate::from_ymd_opt(2024, 10, 16).unwrap());
    }

    #[test]
    fn full_meridiem_as_served_by_the_api() {
        let details =
            parse_astronomy(&payload("07:04 AM", "06:02 PM", "2024-10-16 14:35")).unwrap();

        assert_eq!(details.sunrise, hm(7, 4));
        assert_eq!(details.sunset, hm(18, 2));
    }

    #[test]
    fn noon_and_midnight_edges() {
        let details = parse_astronomy(&payload("12:01a", "12:30p", "2024-12-31 23:59")).unwrap();

        assert_eq!(details.sunrise, hm(0, 1));
        assert_eq!(details.sunset, hm(12, 30));
        assert_eq!(details.local_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn normalization_is_strict() {
        assert_eq!(normalize_meridiem("6:15a").as_deref(), Some("06:15 AM"));
        assert_eq!(normalize_meridiem(" 11:59 pm ").as_deref(), Some("11:59 PM"));
        assert_eq!(normalize_meridiem("6:15"), None);
        assert_eq!(normalize_meridiem("6:15x"), None);
        assert_eq!(normalize_meridiem("6:15 apm"), None);
        assert_eq!(normalize_meridiem("615p"), None);
        assert_eq!(normalize_meridiem("6:5p"), None);
        assert_eq!(normalize_meridiem("106:15p"), None);
        assert_eq!(normalize_meridiem("a6:15"), None);
    }

    #[test]
    fn bad_clock_times_are_malformed() {
        for bad in ["6:15", "13:15p", "0:15a", "6:75a", "noon"] {
            let err = parse_astronomy(&payload(bad, "6:15p", "2024-10-16 9:5")).unwrap_err();
            assert!(matches!(err, WeatherError::MalformedResponse(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn bad_local_time_is_malformed() {
        for bad in ["2024-10-16", "16/10/2024 9:05", "2024-13-01 9:05"] {
            let err = parse_astronomy(&payload("6:15a", "6:15p", bad)).unwrap_err();
            assert!(matches!(err, WeatherError::MalformedResponse(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn missing_astro_section_is_malformed() {
        let err = parse_astronomy(&json!({ "location": { "localtime": "2024-10-16 9:5" } }))
            .unwrap_err();
        assert!(err.to_string().contains("astronomy"));
    }
}
