use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// WeatherAPI.com credentials and request tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeocoderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [weatherapi]
    /// api_key = "..."
    /// forecast_days = 3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weatherapi: Option<ProviderConfig>,

    #[serde(default)]
    pub geocoder: GeocoderConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skyview", "skyview")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the file backing the unit preference store.
    pub fn preferences_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("preferences.toml"))
    }

    /// Set or replace the API key, keeping any other provider settings.
    pub fn set_api_key(&mut self, api_key: String) {
        match &mut self.weatherapi {
            Some(provider) => provider.api_key = api_key,
            None => {
                self.weatherapi =
                    Some(ProviderConfig { api_key, base_url: None, forecast_days: None });
            }
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.weatherapi.as_ref().map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}
