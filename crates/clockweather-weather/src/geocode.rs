//! Forward geocoding: resolve a free-text city name to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use serde::Deserialize;
use tracing::instrument;

use crate::fetch::HttpSession;
use crate::types::{Coordinates, WeatherError};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // Omitted entirely when nothing matched
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    name: String,
    admin1: Option<String>,
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

/// First search hit, ready to store
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPlace {
    pub label: String,
    pub coordinates: Coordinates,
}

impl From<SearchResult> for GeoPlace {
    fn from(result: SearchResult) -> Self {
        Self {
            label: compose_label(
                &result.name,
                result.admin1.as_deref(),
                result.country.as_deref(),
            ),
            coordinates: Coordinates::new(result.latitude, result.longitude),
        }
    }
}

/// Build a display name like "Berlin, Land Berlin, Germany", skipping missing
/// or blank parts.
pub fn compose_label(name: &str, admin1: Option<&str>, country: Option<&str>) -> String {
    [Some(name), admin1, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// City-name search against the geocoding API
#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
}

impl Geocoder {
    pub fn new() -> Self {
        Self::with_base_url(GEOCODING_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}?name={}&count=1&format=json",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    /// Look up `query` and return the first hit, or `None` when nothing matched.
    #[instrument(skip(self, session), level = "info")]
    pub async fn search(
        &self,
        session: &HttpSession,
        query: &str,
    ) -> Result<Option<GeoPlace>, WeatherError> {
        let body: SearchResponse = session.get_json(&self.search_url(query)).await?;
        let place = body.results.into_iter().next().map(GeoPlace::from);

        match &place {
            Some(p) => tracing::info!("Geocoded to: {}", p.label),
            None => tracing::info!("No geocoding results"),
        }
        Ok(place)
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}
