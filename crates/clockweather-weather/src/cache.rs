//! Last successful weather observation, shared between the refresh loop and
//! the label renderer.

use parking_lot::RwLock;

use crate::types::{CurrentWeather, WeatherIcon};

/// Text shown before the first successful refresh
pub const PLACEHOLDER_TEXT: &str = "–°C";

/// What the panel shows in its weather phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub text: String,
    pub icon: WeatherIcon,
}

impl Observation {
    pub fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER_TEXT.to_string(),
            icon: WeatherIcon::Cloudy,
        }
    }

    /// Round the temperature to whole degrees and map the weather code.
    pub fn from_current(current: &CurrentWeather) -> Self {
        // `as` saturates, and -0.0 becomes 0
        let degrees = current.temperature.round() as i64;
        Self {
            text: format!("{degrees}°C"),
            icon: WeatherIcon::from_wmo_code(current.weathercode),
        }
    }

    /// `"<icon> <temperature>"` as shown in the panel
    pub fn label(&self) -> String {
        format!("{} {}", self.icon.glyph(), self.text)
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// In-memory weather cache.
///
/// Holds exactly one observation. Readers get a clone of the whole value, so
/// text and icon always come from the same refresh.
#[derive(Debug, Default)]
pub struct WeatherCache {
    current: RwLock<Observation>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Observation {
        self.current.read().clone()
    }

    pub fn replace(&self, observation: Observation) {
        *self.current.write() = observation;
    }
}
