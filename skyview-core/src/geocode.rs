//! Reverse geocoding: coordinates to locality / state / country.
//! Uses Nominatim (OpenStreetMap), which needs no API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, info};

use crate::{
    error::WeatherError,
    model::{Address, Coordinates},
};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("skyview/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait ReverseGeocoder: Send + Sync + Debug {
    /// Best address candidate for `coords`.
    ///
    /// Fails with [`WeatherError::GeocodeUnavailable`] when there is none.
    async fn reverse(&self, coords: Coordinates) -> Result<Address, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for Address {
    fn from(addr: NominatimAddress) -> Self {
        Address {
            // Prefer city > town > village > hamlet > municipality
            locality: addr
                .city
                .or(addr.town)
                .or(addr.village)
                .or(addr.hamlet)
                .or(addr.municipality),
            admin_area: addr.state,
            country: addr.country,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    http: Client,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        Self { base_url: NOMINATIM_URL.to_string(), http: Client::new() }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<Address, WeatherError> {
        let url = format!("{}/reverse", self.base_url);
        debug!(%coords, "reverse geocoding");

        let res = self
            .http
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|err| {
                WeatherError::FetchFailed(format!("Reverse geocode request failed: {err}"))
            })?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::FetchFailed(format!(
                "Reverse geocode returned status {status}"
            )));
        }

        // Nominatim answers `{"error": "Unable to geocode"}` when nothing matches.
        let body: NominatimResponse = res
            .json()
            .await
            .map_err(|err| WeatherError::malformed("reverse geocode response", err))?;

        let address: Address = body
            .address
            .map(Address::from)
            .ok_or(WeatherError::GeocodeUnavailable {
                latitude: coords.latitude,
                longitude: coords.longitude,
            })?;

        info!(?address, "reverse geocoded");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header_exists, method, path, query_param},
    };

    async fn server_with(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "42.27"))
            .and(query_param("lon", "-71.8"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn picks_city_state_country() {
        let server = server_with(json!({
            "display_name": "Worcester, Worcester County, Massachusetts, United States",
            "address": {
                "city": "Worcester",
                "county": "Worcester County",
                "state": "Massachusetts",
                "country": "United States"
            }
        }))
        .await;

        let address = NominatimGeocoder::new()
            .with_base_url(server.uri())
            .reverse(Coordinates::new(42.27, -71.8))
            .await
            .unwrap();

        assert_eq!(address.locality.as_deref(), Some("Worcester"));
        assert_eq!(address.admin_area.as_deref(), Some("Massachusetts"));
        assert_eq!(address.country.as_deref(), Some("United States"));
    }

    #[tokio::test]
    async fn falls_back_to_town_and_leaves_gaps() {
        let server = server_with(json!({ "address": { "village": "Holden" } })).await;

        let address = NominatimGeocoder::new()
            .with_base_url(server.uri())
            .reverse(Coordinates::new(42.27, -71.8))
            .await
            .unwrap();

        assert_eq!(address.locality.as_deref(), Some("Holden"));
        assert_eq!(address.admin_area, None);
        assert_eq!(address.country, None);
    }

    #[tokio::test]
    async fn no_address_is_geocode_unavailable() {
        let server = server_with(json!({ "error": "Unable to geocode" })).await;

        let err = NominatimGeocoder::new()
            .with_base_url(server.uri())
            .reverse(Coordinates::new(42.27, -71.8))
            .await
            .unwrap_err();

        assert_eq!(err, WeatherError::GeocodeUnavailable { latitude: 42.27, longitude: -71.8 });
    }

    #[tokio::test]
    async fn error_status_is_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = NominatimGeocoder::new()
            .with_base_url(server.uri())
            .reverse(Coordinates::new(42.27, -71.8))
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::FetchFailed(_)));
    }
}
