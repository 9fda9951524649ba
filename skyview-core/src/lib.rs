//! Core library for the `skyview` CLI.
//!
//! This crate defines:
//! - Unit-aware parsing of WeatherAPI.com weather and astronomy documents
//! - Unit preference semantics over a pluggable key-value store
//! - The session presenter that fetches, parses and publishes views
//! - HTTP collaborators (WeatherAPI.com, Nominatim) behind traits
//! - Configuration & credentials handling
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod error;
pub mod geocode;
pub mod model;
pub mod parse;
pub mod presenter;
pub mod provider;
pub mod units;

pub use condition::ColorCategory;
pub use config::{Config, GeocoderConfig, ProviderConfig};
pub use error::WeatherError;
pub use geocode::{NominatimGeocoder, ReverseGeocoder};
pub use model::{
    Address, Coordinates, CurrentWeather, ForecastDay, Location, LocationDetails, Place,
    WeatherReport, icon_href,
};
pub use presenter::{Phase, View, WeatherPresenter};
pub use provider::{WeatherSource, weatherapi::WeatherApiClient};
pub use units::{FilePreferences, MemoryPreferences, PreferenceStore, UnitPreferences, UnitSystem};
