use serde::{Deserialize, Serialize};

/// Background classification for a condition description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorCategory {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    Cloudy,
    Rain,
    Snow,
    Sleet,
    Fog,
    #[default]
    Neutral,
}

impl ColorCategory {
    /// Case-insensitive exact match; anything unrecognised is [`ColorCategory::Neutral`].
    pub fn for_condition(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "sunny" => Self::ClearDay,
            "clear night" | "night" => Self::ClearNight,
            "partly cloudy" => Self::PartlyCloudyDay,
            "cloudy" | "overcast" => Self::Cloudy,
            "rain" | "showers" | "thunderstorm" => Self::Rain,
            "snow" => Self::Snow,
            "sleet" => Self::Sleet,
            "fog" | "mist" => Self::Fog,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClearDay => "clear-day",
            Self::ClearNight => "clear-night",
            Self::PartlyCloudyDay => "partly-cloudy-day",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Sleet => "sleet",
            Self::Fog => "fog",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
