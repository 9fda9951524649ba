use chrono::NaiveTime;
use skyview_core::{Phase, UnitSystem, View, WeatherReport, icon_href};

/// Plain-text rendering of a presenter view.
pub fn render_text(view: &View) -> String {
    let mut lines = Vec::new();

    let location = view
        .place
        .as_ref()
        .map(|place| &place.location)
        .or(view.location.as_ref());
    if let Some(location) = location {
        lines.push(location.display_name());
    }

    if let Some(place) = &view.place {
        let details = &place.details;
        lines.push(format!(
            "{} | Sunrise: {} | Sunset: {}",
            details.local_date.format("%A %Y-%m-%d"),
            clock(details.sunrise),
            clock(details.sunset),
        ));
    }

    if let Some(report) = &view.report {
        lines.push(String::new());
        lines.extend(current_lines(report, view));
        lines.push(String::new());
        lines.push("Forecast".to_string());
        lines.extend(forecast_lines(report));

        if report.unit != view.unit {
            lines.push(String::new());
            lines.push(format!(
                "Showing {} data; switching to {} did not complete.",
                report.unit, view.unit
            ));
        }
    }

    match view.phase {
        Phase::Idle if view.report.is_none() => lines.push("No weather loaded yet.".to_string()),
        Phase::Loading => lines.push("Loading...".to_string()),
        Phase::Failed => {
            lines.push(String::new());
            match &view.error {
                Some(err) => lines.push(format!("Error: {err}")),
                None => lines.push("Error: request failed".to_string()),
            }
        }
        _ => {}
    }

    lines.join("\n")
}

fn current_lines(report: &WeatherReport, view: &View) -> Vec<String> {
    let unit = report.unit;
    let current = &report.current;

    vec![
        format!(
            "{}  {}  [{}]",
            temperature(current.temperature, unit),
            current.condition,
            view.color_category(),
        ),
        format!("Icon: {}", icon_href(&current.icon_url)),
        format!(
            "Humidity: {}%  Pressure: {} {}  Precipitation: {} {}  Wind: {} {}",
            current.humidity,
            current.pressure,
            unit.pressure_label(),
            current.precipitation,
            unit.precipitation_label(),
            current.wind_speed,
            unit.wind_label(),
        ),
    ]
}

fn forecast_lines(report: &WeatherReport) -> Vec<String> {
    report
        .forecast
        .iter()
        .map(|day| {
            format!(
                "{}  {} / {}  {}  {}",
                day.date,
                temperature(day.max_temp, report.unit),
                temperature(day.min_temp, report.unit),
                day.condition,
                icon_href(&day.icon_url),
            )
        })
        .collect()
}

fn temperature(value: f64, unit: UnitSystem) -> String {
    format!("{value:.1}{}", unit.temperature_label())
}

fn clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}
