//! Weather refresh: one fetch per tick, result written to the cache.

use std::sync::Arc;

use clockweather_core::SettingsStore;
use clockweather_weather::{HttpSession, Observation, WeatherCache, WeatherProvider};
use tokio_util::sync::CancellationToken;

/// What a single refresh did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Coordinates are the unset sentinel; no request was made
    NoLocation,
    Updated(Observation),
    /// Request or parse failed; the cache keeps its previous value
    Failed,
    /// The panel was torn down while the request was in flight
    Aborted,
}

/// Refreshes the weather cache from the stored coordinates
pub struct WeatherUpdater {
    settings: Arc<dyn SettingsStore>,
    session: Arc<HttpSession>,
    provider: WeatherProvider,
    cache: Arc<WeatherCache>,
    teardown: CancellationToken,
}

impl WeatherUpdater {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        session: Arc<HttpSession>,
        provider: WeatherProvider,
        cache: Arc<WeatherCache>,
        teardown: CancellationToken,
    ) -> Self {
        Self {
            settings,
            session,
            provider,
            cache,
            teardown,
        }
    }

    /// Run one refresh. Failures are logged and absorbed.
    pub async fn update(&self) -> UpdateOutcome {
        if self.teardown.is_cancelled() {
            return UpdateOutcome::Aborted;
        }

        let coordinates = self.settings.get().coordinates();
        if coordinates.is_unset() {
            tracing::debug!("No location configured, skipping weather refresh");
            return UpdateOutcome::NoLocation;
        }

        match self.provider.current(&self.session, coordinates).await {
            Ok(observation) => {
                // A response that lands after stop() is dropped
                if self.teardown.is_cancelled() {
                    return UpdateOutcome::Aborted;
                }
                self.cache.replace(observation.clone());
                tracing::info!(
                    "Weather updated: {} ({})",
                    observation.text,
                    observation.icon.description()
                );
                UpdateOutcome::Updated(observation)
            }
            Err(e) if e.is_aborted() => {
                tracing::debug!("Weather refresh aborted");
                UpdateOutcome::Aborted
            }
            Err(e) => {
                tracing::warn!("Weather refresh failed, keeping cached value: {}", e);
                UpdateOutcome::Failed
            }
        }
    }
}
