use serde::{Deserialize, Serialize};

use crate::fetch::FetchError;

/// Panel icon for the current conditions, bucketed from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Clear,
    PartlyCloudy,
    #[default]
    Cloudy,
    Rain,
    Snow,
    Storm,
}

impl WeatherIcon {
    /// Convert a WMO weather code to a panel icon.
    ///
    /// Codes are ranges rather than discrete values, so buckets are checked in
    /// order by inclusive upper bound. Anything outside 0..=99 is cloudy.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::PartlyCloudy,
            3..=48 => Self::Cloudy,
            49..=67 => Self::Rain,
            68..=77 => Self::Snow,
            78..=99 => Self::Storm,
            _ => Self::Cloudy,
        }
    }

    /// Glyph shown in the panel label
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::PartlyCloudy => "⛅",
            Self::Cloudy => "☁️",
            Self::Rain => "🌧️",
            Self::Snow => "❄️",
            Self::Storm => "⛈️",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Storm => "Thunderstorm",
        }
    }
}

impl std::fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Geographic coordinates.
///
/// `0.0/0.0` doubles as "no location configured". That also swallows the real
/// point where the equator meets the prime meridian; hosts have never stored a
/// location there, so the sentinel stays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const UNSET: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are exactly the `0.0` sentinel
    pub fn is_unset(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Forecast endpoint response, trimmed to what the panel reads
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: Option<CurrentWeather>,
}

/// `current_weather` block of the forecast response
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub weathercode: i64,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Response is missing `{0}`")]
    MissingField(&'static str),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Fetch(e) => e.user_message(),
            WeatherError::MissingField(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }

    /// True when the request died because its session was torn down
    pub fn is_aborted(&self) -> bool {
        matches!(self, WeatherError::Fetch(FetchError::Aborted))
    }
}
