//! Weather data for the clock/weather panel
//!
//! Fetches current conditions from the Open-Meteo API, resolves city names
//! through its geocoding API and keeps the last observation for the label.

pub mod types;
pub mod cache;
pub mod fetch;
pub mod geocode;
pub mod provider;

pub use types::*;
pub use cache::{Observation, WeatherCache};
pub use fetch::{fetch_json, FetchError, HttpSession};
pub use geocode::{GeoPlace, Geocoder};
pub use provider::WeatherProvider;
