//! Pure transformations from WeatherAPI.com JSON documents into domain records.
//!
//! Payloads are decoded through small typed schemas. A missing or mistyped
//! field becomes [`WeatherError::MalformedResponse`] at the schema boundary.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::WeatherError;

pub mod astronomy;
pub mod weather;

pub use astronomy::parse_astronomy;
pub use weather::{parse_current, parse_forecast, parse_weather, parse_weather_body};

fn section<'a>(doc: &'a Value, key: &str) -> Result<&'a Value, WeatherError> {
    doc.get(key)
        .ok_or_else(|| WeatherError::MalformedResponse(format!("missing `{key}` section")))
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T, WeatherError> {
    T::deserialize(value).map_err(|err| WeatherError::malformed(what, err))
}
