use tracing::instrument;

use crate::cache::Observation;
use crate::fetch::HttpSession;
use crate::types::{Coordinates, ForecastResponse, WeatherError};

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Current-conditions lookup against the Open-Meteo forecast API
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    base_url: String,
}

impl WeatherProvider {
    pub fn new() -> Self {
        Self::with_base_url(FORECAST_URL)
    }

    /// Point the provider at another forecast endpoint (mirrors, mock servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn forecast_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}?latitude={}&longitude={}&current_weather=true",
            self.base_url, coordinates.latitude, coordinates.longitude
        )
    }

    /// Fetch current conditions for `coordinates`.
    #[instrument(skip(self, session), level = "debug")]
    pub async fn current(
        &self,
        session: &HttpSession,
        coordinates: Coordinates,
    ) -> Result<Observation, WeatherError> {
        let url = self.forecast_url(coordinates);
        let body: ForecastResponse = session.get_json(&url).await?;
        let current = body
            .current_weather
            .ok_or(WeatherError::MissingField("current_weather"))?;

        Ok(Observation::from_current(&current))
    }
}

impl Default for WeatherProvider {
    fn default() -> Self {
        Self::new()
    }
}
