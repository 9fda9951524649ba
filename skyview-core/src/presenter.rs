//! Session state for one coordinate: location, astronomy and weather.
//!
//! The presenter owns a [`watch`] channel of [`View`] snapshots. Every update
//! builds the new value first and swaps it in under the channel lock, so
//! subscribers only ever see complete values.

use serde::{Serialize, Serializer};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    condition::ColorCategory,
    error::WeatherError,
    geocode::ReverseGeocoder,
    model::{Coordinates, Location, Place, WeatherReport},
    parse::{parse_astronomy, parse_weather},
    provider::WeatherSource,
    units::{UnitPreferences, UnitSystem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Rendered,
    Failed,
}

/// Snapshot handed to renderers.
///
/// `place` and `report` are the last successfully parsed values for
/// `location`. A failure sets `phase` and `error` but leaves them in place.
/// Requesting different coordinates clears them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub phase: Phase,
    /// Preferred unit. May differ from `report.unit` after a toggle whose fetch failed.
    pub unit: UnitSystem,
    pub location: Option<Location>,
    pub place: Option<Place>,
    pub report: Option<WeatherReport>,
    #[serde(serialize_with = "error_message")]
    pub error: Option<WeatherError>,
}

impl View {
    fn new(unit: UnitSystem) -> Self {
        Self {
            phase: Phase::Idle,
            unit,
            location: None,
            place: None,
            report: None,
            error: None,
        }
    }

    pub fn color_category(&self) -> ColorCategory {
        self.report
            .as_ref()
            .map(|report| report.current.color_category())
            .unwrap_or_default()
    }
}

fn error_message<S: Serializer>(error: &Option<WeatherError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => s.serialize_some(&err.to_string()),
        None => s.serialize_none(),
    }
}

#[derive(Debug)]
pub struct WeatherPresenter {
    source: Arc<dyn WeatherSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    prefs: UnitPreferences,
    state: watch::Sender<View>,
}

impl WeatherPresenter {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        geocoder: Arc<dyn ReverseGeocoder>,
        prefs: UnitPreferences,
    ) -> Self {
        let (state, _) = watch::channel(View::new(prefs.load()));
        Self { source, geocoder, prefs, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.state.subscribe()
    }

    pub fn view(&self) -> View {
        self.state.borrow().clone()
    }

    pub fn unit(&self) -> UnitSystem {
        self.state.borrow().unit
    }

    /// Resolve `coords` to a location, then fetch astronomy and weather concurrently.
    pub async fn request(&self, coords: Coordinates) -> Result<(), WeatherError> {
        self.set_phase(Phase::Loading);

        let address = match self.geocoder.reverse(coords).await {
            Ok(address) => address,
            Err(err) => return self.settle(Err(err)),
        };
        let location = Location::from_address(coords, address);
        info!(location = %location.display_name(), "location resolved");
        self.state.send_modify(|view| {
            // Slices fetched for other coordinates do not describe this location.
            if view.location.as_ref().map(Location::coordinates) != Some(coords) {
                view.place = None;
                view.report = None;
            }
            view.location = Some(location.clone());
        });

        let unit = self.unit();
        let (astronomy, weather) =
            tokio::join!(self.refresh_astronomy(location), self.refresh_weather(coords, unit));

        self.settle(astronomy.and(weather))
    }

    /// Repeat [`request`](Self::request) for the current location, if there is one.
    pub async fn refresh(&self) -> Result<(), WeatherError> {
        let location = self.state.borrow().location.clone();
        match location {
            Some(location) => self.request(location.coordinates()).await,
            None => Ok(()),
        }
    }

    /// Flip and persist the unit system, then re-fetch weather under it.
    ///
    /// Astronomy does not depend on units and is left alone. If the fetch
    /// fails the preference stays flipped and the old report stays visible.
    pub async fn toggle_units(&self) -> Result<UnitSystem, WeatherError> {
        let mut next = UnitSystem::default();
        self.state.send_modify(|view| {
            view.unit = view.unit.toggled();
            next = view.unit;
        });
        self.prefs.save(next);
        info!(unit = %next, "unit system toggled");

        let location = self.state.borrow().location.clone();
        let Some(location) = location else {
            return Ok(next);
        };

        self.set_phase(Phase::Loading);
        let outcome = self.refresh_weather(location.coordinates(), next).await;
        self.settle(outcome).map(|()| next)
    }

    async fn refresh_astronomy(&self, location: Location) -> Result<(), WeatherError> {
        let payload = self.source.astronomy(location.coordinates()).await?;
        let details = parse_astronomy(&payload)?;

        let place = Place { location, details };
        self.state.send_modify(|view| view.place = Some(place));
        Ok(())
    }

    /// Fetch and parse weather under `unit`. Returns whether the report was applied.
    async fn refresh_weather(
        &self,
        coords: Coordinates,
        unit: UnitSystem,
    ) -> Result<bool, WeatherError> {
        let payload = self.source.forecast(coords).await?;
        let report = parse_weather(&payload, unit)?;

        // The preference may have been toggled while this request was in flight.
        let applied = self.state.send_if_modified(move |view| {
            if view.unit != report.unit {
                return false;
            }
            view.report = Some(report);
            true
        });

        if !applied {
            debug!(parsed = %unit, current = %self.unit(), "discarding stale weather report");
        }
        Ok(applied)
    }

    fn set_phase(&self, phase: Phase) {
        self.state.send_modify(|view| view.phase = phase);
    }

    fn settle(&self, outcome: Result<bool, WeatherError>) -> Result<(), WeatherError> {
        match outcome {
            Ok(true) => {
                self.state.send_modify(|view| {
                    view.phase = Phase::Rendered;
                    view.error = None;
                });
                info!("weather rendered");
                Ok(())
            }
            // A discarded stale report leaves phase and error to the operation
            // that superseded it.
            Ok(false) => Ok(()),
            Err(err) => {
                warn!(error = %err, "weather refresh failed");
                let recorded = err.clone();
                self.state.send_modify(|view| {
                    view.phase = Phase::Failed;
                    view.error = Some(recorded);
                });
                Err(err)
            }
        }
    }
}
