use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{error::WeatherError, model::Coordinates};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_FORECAST_DAYS: u8 = 3;
const MAX_FORECAST_DAYS: u8 = 14;

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    forecast_days: u8,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Days requested from forecast.json, clamped to what the API serves.
    pub fn with_forecast_days(mut self, days: u8) -> Self {
        self.forecast_days = days.clamp(1, MAX_FORECAST_DAYS);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days
    }

    async fn get_json(
        &self,
        endpoint: &str,
        coords: Coordinates,
        extra: &[(&str, String)],
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, %coords, "requesting WeatherAPI document");

        let mut query = vec![("key", self.api_key.clone()), ("q", coords.query())];
        query.extend(extra.iter().cloned());

        let res = self.http.get(&url).query(&query).send().await.map_err(|err| {
            WeatherError::FetchFailed(format!(
                "Failed to send request to WeatherAPI ({endpoint}): {err}"
            ))
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            WeatherError::FetchFailed(format!("Failed to read WeatherAPI {endpoint} body: {err}"))
        })?;

        if !status.is_success() {
            return Err(WeatherError::FetchFailed(format!(
                "WeatherAPI {endpoint} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|err| WeatherError::malformed(format!("WeatherAPI {endpoint} JSON"), err))
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn astronomy(&self, coords: Coordinates) -> Result<Value, WeatherError> {
        self.get_json("astronomy.json", coords, &[]).await
    }

    async fn forecast(&self, coords: Coordinates) -> Result<Value, WeatherError> {
        let days = self.forecast_days.to_string();
        self.get_json("forecast.json", coords, &[("days", days)]).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
