use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::{debug, warn};

use crate::error::WeatherError;

/// Key under which the unit token is persisted.
pub const UNIT_KEY: &str = "unit_preference";

/// Measurement system used when picking fields out of a weather payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "Imperial",
            UnitSystem::Metric => "Metric",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Imperial, UnitSystem::Metric]
    }

    /// Parse a stored or user-supplied token, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "imperial" => Some(UnitSystem::Imperial),
            "metric" => Some(UnitSystem::Metric),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Imperial => UnitSystem::Metric,
            UnitSystem::Metric => UnitSystem::Imperial,
        }
    }

    /// Toggle a raw stored token. Anything unrecognised normalizes to Imperial.
    pub fn toggle_token(token: &str) -> Self {
        UnitSystem::from_token(token).map_or(UnitSystem::Imperial, UnitSystem::toggled)
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "°F",
            UnitSystem::Metric => "°C",
        }
    }

    pub fn pressure_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "in",
            UnitSystem::Metric => "mb",
        }
    }

    pub fn precipitation_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "in",
            UnitSystem::Metric => "mm",
        }
    }

    pub fn wind_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "mph",
            UnitSystem::Metric => "kph",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        UnitSystem::from_token(value).ok_or_else(|| {
            anyhow::anyhow!("Unknown unit system '{value}'. Supported: imperial, metric.")
        })
    }
}

/// Single-slot string key-value storage for user preferences.
pub trait PreferenceStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError>;
    fn put(&self, key: &str, value: &str) -> Result<(), WeatherError>;
}

/// Flat TOML table on disk, e.g. `unit_preference = "Metric"`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, WeatherError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|err| {
            WeatherError::PersistenceUnavailable(format!("{}: {err}", self.path.display()))
        })?;

        toml::from_str(&contents).map_err(|err| {
            WeatherError::PersistenceUnavailable(format!("{}: {err}", self.path.display()))
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        Ok(self.read_table()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), WeatherError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), value.to_string());

        let unavailable =
            |err: &dyn std::fmt::Display| WeatherError::PersistenceUnavailable(err.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| unavailable(&err))?;
        }
        let contents = toml::to_string(&table).map_err(|err| unavailable(&err))?;
        fs::write(&self.path, contents).map_err(|err| unavailable(&err))?;

        debug!(path = %self.path.display(), key, value, "preference saved");
        Ok(())
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        let values = self
            .values
            .lock()
            .map_err(|_| WeatherError::PersistenceUnavailable("lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), WeatherError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| WeatherError::PersistenceUnavailable("lock poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Unit preference semantics on top of a [`PreferenceStore`].
///
/// Store failures never escape: they are logged and the default unit is used.
#[derive(Debug, Clone)]
pub struct UnitPreferences {
    store: Arc<dyn PreferenceStore>,
}

impl UnitPreferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::default()))
    }

    pub fn load(&self) -> UnitSystem {
        match self.store.get(UNIT_KEY) {
            Ok(Some(token)) => UnitSystem::from_token(&token).unwrap_or_else(|| {
                warn!(token, "unrecognised unit preference, using default");
                UnitSystem::default()
            }),
            Ok(None) => UnitSystem::default(),
            Err(err) => {
                warn!(error = %err, "could not load unit preference, using default");
                UnitSystem::default()
            }
        }
    }

    pub fn save(&self, unit: UnitSystem) {
        if let Err(err) = self.store.put(UNIT_KEY, unit.as_str()) {
            warn!(error = %err, unit = %unit, "could not persist unit preference");
        }
    }

    /// Flip the stored token and persist the result.
    pub fn toggle(&self) -> UnitSystem {
        let next = match self.store.get(UNIT_KEY) {
            Ok(Some(token)) => UnitSystem::toggle_token(&token),
            Ok(None) => UnitSystem::default().toggled(),
            Err(err) => {
                warn!(error = %err, "could not load unit preference before toggling");
                UnitSystem::default().toggled()
            }
        };
        self.save(next);
        next
    }
}
