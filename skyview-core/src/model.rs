use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{condition::ColorCategory, units::UnitSystem};

pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_STATE: &str = "Unknown State";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `"lat,lon"` form accepted by the weather API's `q` parameter.
    pub fn query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Best-effort result of reverse geocoding; any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub locality: Option<String>,
    pub admin_area: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub locality: String,
    pub admin_area: String,
    pub country: String,
}

impl Location {
    pub fn from_address(coords: Coordinates, address: Address) -> Self {
        Self {
            latitude: coords.latitude,
            longitude: coords.longitude,
            locality: address.locality.unwrap_or_else(|| UNKNOWN_CITY.to_string()),
            admin_area: address.admin_area.unwrap_or_else(|| UNKNOWN_STATE.to_string()),
            country: address.country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}, {}", self.locality, self.admin_area, self.country)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetails {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub local_date: NaiveDate,
}

/// A location together with its astronomy for the local day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub location: Location,
    pub details: LocationDetails,
}

/// Current conditions. Numeric fields are in the units the report was parsed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub condition: String,
    pub icon_url: String,
    pub humidity: f64,
    pub pressure: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
}

impl CurrentWeather {
    pub fn color_category(&self) -> ColorCategory {
        ColorCategory::for_condition(&self.condition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp: f64,
    pub min_temp: f64,
    pub condition: String,
    pub icon_url: String,
}

/// Current conditions and forecast parsed together under one unit system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub unit: UnitSystem,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

/// Icon paths from the API are protocol-relative (`//cdn.weatherapi.com/...`).
pub fn icon_href(path: &str) -> String {
    if path.starts_with("//") {
        format!("https:{path}")
    } else {
        path.to_string()
    }
}
