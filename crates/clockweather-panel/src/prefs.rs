//! Preferences backend: settings edits and the debounced location lookup.
//!
//! Typing in the location field restarts a debounce timer; only the last edit
//! in the window is geocoded. Every lookup runs on its own short-lived HTTP
//! session. Transport or parse failures show an error status and leave the
//! stored location alone.

use std::sync::Arc;
use std::time::Duration;

use clockweather_core::{Config, Settings, SettingsError, SettingsStore, INTERVAL_RANGE};
use clockweather_weather::{Geocoder, HttpSession};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::timer::{self, TimerSlot};

/// Stored label when the query matched nothing
pub const NOT_FOUND_LABEL: &str = "Not found";

/// State of the "detected location" row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    /// No location configured
    Unset,
    Searching,
    Resolved(String),
    NotFound,
    /// Lookup failed; carries a short user-facing reason
    Error(String),
}

impl LookupStatus {
    fn from_settings(settings: &Settings) -> Self {
        if settings.location_label.is_empty() {
            LookupStatus::Unset
        } else if settings.location_label == NOT_FOUND_LABEL {
            LookupStatus::NotFound
        } else {
            LookupStatus::Resolved(settings.location_label.clone())
        }
    }
}

impl std::fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStatus::Unset => f.write_str("—"),
            LookupStatus::Searching => f.write_str("Searching…"),
            LookupStatus::Resolved(label) => f.write_str(label),
            LookupStatus::NotFound => f.write_str(NOT_FOUND_LABEL),
            LookupStatus::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// Host-side knobs for the preferences backend
#[derive(Debug, Clone)]
pub struct PrefsOptions {
    pub geocoding_url: String,
    pub user_agent: String,
    pub request_timeout: Option<Duration>,
    pub debounce: Duration,
}

impl Default for PrefsOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PrefsOptions {
    fn from(config: &Config) -> Self {
        Self {
            geocoding_url: config.api.geocoding_url.clone(),
            user_agent: config.api.user_agent.clone(),
            request_timeout: config.api.request_timeout(),
            debounce: config.prefs.debounce(),
        }
    }
}

struct Inner {
    settings: Arc<dyn SettingsStore>,
    geocoder: Geocoder,
    user_agent: String,
    request_timeout: Option<Duration>,
    status: watch::Sender<LookupStatus>,
}

/// Preferences window backend
pub struct Preferences {
    inner: Arc<Inner>,
    debounce: Duration,
    pending: Mutex<TimerSlot>,
}

impl Preferences {
    pub fn new(settings: Arc<dyn SettingsStore>, options: PrefsOptions) -> Self {
        let initial = LookupStatus::from_settings(&settings.get());
        let (status, _rx) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                settings,
                geocoder: Geocoder::with_base_url(options.geocoding_url),
                user_agent: options.user_agent,
                request_timeout: options.request_timeout,
                status,
            }),
            debounce: options.debounce,
            pending: Mutex::new(TimerSlot::new("location-debounce")),
        }
    }

    pub fn settings(&self) -> Settings {
        self.inner.settings.get()
    }

    /// Store a new switch interval, clamped like the dialog's spin button.
    /// Returns the value actually stored.
    pub fn set_interval_seconds(&self, seconds: i64) -> Result<u32, SettingsError> {
        let clamped = seconds.clamp(
            i64::from(*INTERVAL_RANGE.start()),
            i64::from(*INTERVAL_RANGE.end()),
        );
        let interval = u32::try_from(clamped).unwrap_or(*INTERVAL_RANGE.start());
        self.inner
            .settings
            .update(|s| s.interval_seconds = interval)?;
        Ok(interval)
    }

    pub fn set_show_clock_icon(&self, show: bool) -> Result<(), SettingsError> {
        self.inner.settings.update(|s| s.show_clock_icon = show)
    }

    /// Status updates for the "detected location" row
    pub fn status(&self) -> watch::Receiver<LookupStatus> {
        self.inner.status.subscribe()
    }

    pub fn current_status(&self) -> LookupStatus {
        self.inner.status.borrow().clone()
    }

    /// Location field edited. Restarts the debounce; a pending lookup for an
    /// earlier edit is dropped. Must be called from within a tokio runtime.
    pub fn location_changed(&self, text: impl Into<String>) {
        let text = text.into();
        let inner = Arc::clone(&self.inner);
        let handle = timer::after(self.debounce, async move {
            inner.lookup(&text).await;
        });
        self.pending.lock().replace(handle);
    }

    /// True while a debounced lookup is waiting or running
    pub fn has_pending_lookup(&self) -> bool {
        self.pending.lock().is_armed()
    }

    /// Look up `query` right away, bypassing the debounce.
    pub async fn lookup(&self, query: &str) -> LookupStatus {
        self.inner.lookup(query).await
    }
}

impl Inner {
    async fn lookup(&self, raw: &str) -> LookupStatus {
        let query = raw.trim();
        if let Err(e) = self.settings.update(|s| s.location_query = query.to_string()) {
            tracing::warn!("Failed to store location query: {}", e);
        }

        if query.is_empty() {
            let status = match self.settings.update(|s| s.clear_location("")) {
                Ok(()) => LookupStatus::Unset,
                Err(e) => LookupStatus::Error(e.user_message().to_string()),
            };
            return self.publish(status);
        }

        self.publish(LookupStatus::Searching);

        let session = match HttpSession::with_options(&self.user_agent, self.request_timeout) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Failed to create geocoding session: {}", e);
                return self.publish(LookupStatus::Error(e.user_message().to_string()));
            }
        };
        let result = self.geocoder.search(&session, query).await;
        session.abort();

        let status = match result {
            Ok(Some(place)) => {
                let label = place.label.clone();
                self.store(|s| s.set_location(place.label, place.coordinates), LookupStatus::Resolved(label))
            }
            Ok(None) => self.store(|s| s.clear_location(NOT_FOUND_LABEL), LookupStatus::NotFound),
            Err(e) => {
                tracing::warn!("Location lookup for {:?} failed: {}", query, e);
                LookupStatus::Error(e.user_message().to_string())
            }
        };
        self.publish(status)
    }

    fn store(&self, f: impl FnOnce(&mut Settings), status: LookupStatus) -> LookupStatus {
        match self.settings.update(f) {
            Ok(()) => status,
            Err(e) => {
                tracing::warn!("Failed to store location: {}", e);
                LookupStatus::Error(e.user_message().to_string())
            }
        }
    }

    fn publish(&self, status: LookupStatus) -> LookupStatus {
        self.status.send_replace(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clockweather_core::MemorySettingsStore;

    fn prefs_with(settings: Settings) -> Preferences {
        Preferences::new(Arc::new(MemorySettingsStore::new(settings)), PrefsOptions::default())
    }

    #[test]
    fn test_status_display_strings() {
        assert_eq!(LookupStatus::Unset.to_string(), "—");
        assert_eq!(LookupStatus::Searching.to_string(), "Searching…");
        assert_eq!(LookupStatus::NotFound.to_string(), "Not found");
        assert_eq!(LookupStatus::Resolved("Berlin, Germany".into()).to_string(), "Berlin, Germany");
        assert!(LookupStatus::Error("offline".into()).to_string().starts_with("Error"));
    }

    #[test]
    fn test_initial_status_reflects_stored_label() {
        assert_eq!(prefs_with(Settings::default()).current_status(), LookupStatus::Unset);

        let stored = Settings {
            location_label: "Osnabrück, Germany".into(),
            latitude: 52.27,
            longitude: 8.05,
            ..Settings::default()
        };
        assert_eq!(
            prefs_with(stored).current_status(),
            LookupStatus::Resolved("Osnabrück, Germany".into())
        );
    }

    #[test]
    fn test_interval_is_clamped_to_range() {
        let prefs = prefs_with(Settings::default());
        assert_eq!(prefs.set_interval_seconds(1).unwrap(), 2);
        assert_eq!(prefs.settings().interval_seconds, 2);
        assert_eq!(prefs.set_interval_seconds(-5).unwrap(), 2);
        assert_eq!(prefs.set_interval_seconds(500).unwrap(), 120);
        assert_eq!(prefs.set_interval_seconds(45).unwrap(), 45);
        assert_eq!(prefs.settings().interval_seconds, 45);
    }

    #[test]
    fn test_clock_icon_toggle_is_stored() {
        let prefs = prefs_with(Settings::default());
        prefs.set_show_clock_icon(true).unwrap();
        assert!(prefs.settings().show_clock_icon);
    }

    #[tokio::test]
    async fn test_empty_query_clears_location_without_network() {
        let stored = Settings {
            location_query: "Berlin".into(),
            location_label: "Berlin, Germany".into(),
            latitude: 52.52,
            longitude: 13.41,
            ..Settings::default()
        };
        let prefs = prefs_with(stored);

        assert_eq!(prefs.lookup("   ").await, LookupStatus::Unset);
        let settings = prefs.settings();
        assert_eq!(settings.location_query, "");
        assert_eq!(settings.location_label, "");
        assert!(settings.coordinates().is_unset());
        assert_eq!(prefs.current_status(), LookupStatus::Unset);
    }
}
