use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use skyview_core::{
    Config, Coordinates, FilePreferences, MemoryPreferences, Phase, PreferenceStore,
    UnitPreferences, WeatherPresenter,
    provider::{geocoder_from_config, source_from_config},
};

use crate::render::render_text;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Current weather, sunrise/sunset and forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure {
        /// Key to store; prompted for when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show weather for a latitude/longitude pair.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Overrides the configured key.
        #[arg(long, env = "WEATHERAPI_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Print the view as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Keep the session open to toggle units or refresh.
        #[arg(long, short)]
        interactive: bool,
    },

    /// Print the stored unit system.
    Units {
        /// Switch between Imperial and Metric before printing.
        #[arg(long)]
        toggle: bool,
    },
}

const TOGGLE: &str = "Toggle units";
const REFRESH: &str = "Refresh";
const QUIT: &str = "Quit";

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { api_key } => configure(api_key),
            Command::Show { lat, lon, api_key, json, interactive } => {
                show(Coordinates::new(lat, lon), api_key, json, interactive).await
            }
            Command::Units { toggle } => {
                let prefs = UnitPreferences::new(open_preferences());
                let unit = if toggle { prefs.toggle() } else { prefs.load() };
                println!("{unit}");
                Ok(())
            }
        }
    }
}

fn configure(api_key: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = match api_key {
        Some(key) => key,
        None => Password::new("WeatherAPI.com API key:")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    coords: Coordinates,
    api_key: Option<String>,
    json: bool,
    interactive: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = source_from_config(&config, api_key.as_deref())?;
    let geocoder = geocoder_from_config(&config);
    let presenter = WeatherPresenter::new(
        Arc::new(source),
        Arc::new(geocoder),
        UnitPreferences::new(open_preferences()),
    );
    let mut views = presenter.subscribe();

    // Failures are recorded in the view and rendered with it.
    if let Err(err) = presenter.request(coords).await {
        tracing::debug!(error = %err, "initial request failed");
    }
    print_view(&views.borrow_and_update(), json)?;

    if !interactive {
        let view = presenter.view();
        if view.phase == Phase::Failed {
            let err = view
                .error
                .map(anyhow::Error::new)
                .unwrap_or_else(|| anyhow::anyhow!("request failed"));
            return Err(err.context(format!("Could not load weather for {coords}")));
        }
        return Ok(());
    }

    loop {
        let choice = Select::new("Next:", vec![TOGGLE, REFRESH, QUIT])
            .prompt()
            .context("Failed to read selection")?;

        let outcome = match choice {
            TOGGLE => presenter.toggle_units().await.map(|_| ()),
            REFRESH => presenter.refresh().await,
            _ => break,
        };
        if let Err(err) = outcome {
            tracing::debug!(error = %err, action = choice, "session action failed");
        }

        if views.has_changed().unwrap_or(false) {
            print_view(&views.borrow_and_update(), json)?;
        }
    }

    Ok(())
}

fn print_view(view: &skyview_core::View, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view).context("Failed to serialize view")?);
    } else {
        println!("{}\n", render_text(view));
    }
    Ok(())
}

/// Falls back to an in-memory store so a missing config dir never stops a session.
fn open_preferences() -> Arc<dyn PreferenceStore> {
    match Config::preferences_file_path() {
        Ok(path) => Arc::new(FilePreferences::new(path)),
        Err(err) => {
            tracing::warn!(error = %err, "preferences will not be persisted");
            Arc::new(MemoryPreferences::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let args = ["skyview", "show", "--lat", "-33.87", "--lon", "-151.2", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Command::Show { lat, lon, json, interactive, .. } => {
                assert_eq!(lat, -33.87);
                assert_eq!(lon, -151.2);
                assert!(json);
                assert!(!interactive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_coordinates() {
        assert!(Cli::try_parse_from(["skyview", "show", "--lat", "42.27"]).is_err());
    }

    #[test]
    fn units_toggle_flag() {
        let cli = Cli::try_parse_from(["skyview", "units", "--toggle"]).unwrap();
        assert!(matches!(cli.command, Command::Units { toggle: true }));
    }
}
