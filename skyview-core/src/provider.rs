use crate::{
    Config, WeatherError,
    geocode::NominatimGeocoder,
    model::Coordinates,
    provider::weatherapi::WeatherApiClient,
};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod weatherapi;

/// Raw documents from the weather API; parsing happens in [`crate::parse`].
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// astronomy.json for today at `coords`.
    async fn astronomy(&self, coords: Coordinates) -> Result<Value, WeatherError>;

    /// forecast.json (current conditions plus daily forecast) at `coords`.
    async fn forecast(&self, coords: Coordinates) -> Result<Value, WeatherError>;
}

/// Build the WeatherAPI.com client from config.
///
/// `api_key` overrides whatever key is stored in the config file.
pub fn source_from_config(
    config: &Config,
    api_key: Option<&str>,
) -> anyhow::Result<WeatherApiClient> {
    let key = api_key.or_else(|| config.api_key()).ok_or_else(|| {
        anyhow::anyhow!(
            "No WeatherAPI.com key configured.\n\
                 Hint: run `skyview configure` and enter your API key."
        )
    })?;

    let mut client = WeatherApiClient::new(key.to_owned());
    if let Some(provider) = &config.weatherapi {
        if let Some(url) = &provider.base_url {
            client = client.with_base_url(url);
        }
        if let Some(days) = provider.forecast_days {
            client = client.with_forecast_days(days);
        }
    }

    Ok(client)
}

pub fn geocoder_from_config(config: &Config) -> NominatimGeocoder {
    match &config.geocoder.base_url {
        Some(url) => NominatimGeocoder::new().with_base_url(url),
        None => NominatimGeocoder::new(),
    }
}
