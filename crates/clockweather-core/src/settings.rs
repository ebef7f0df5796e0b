//! User-facing panel settings and the stores that persist them.
//!
//! Settings are read whole and written whole. Stores publish every effective
//! change on a `watch` channel so the panel can react (e.g. restart its
//! alternation timer when `interval-seconds` changes).

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use clockweather_weather::Coordinates;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::ValidationResult;

/// Accepted values for `interval-seconds`
pub const INTERVAL_RANGE: RangeInclusive<u32> = 2..=120;

/// Persisted panel settings, keyed like the host's schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Seconds between clock and weather display
    pub interval_seconds: u32,
    pub show_clock_icon: bool,
    /// City text as typed in preferences
    pub location_query: String,
    /// Resolved display name; empty when unset
    pub location_label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_seconds: 10,
            show_clock_icon: false,
            location_query: String::new(),
            location_label: String::new(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

impl Settings {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// `interval-seconds` forced into [`INTERVAL_RANGE`]
    pub fn clamped_interval(&self) -> u32 {
        self.interval_seconds
            .clamp(*INTERVAL_RANGE.start(), *INTERVAL_RANGE.end())
    }

    pub fn set_location(&mut self, label: impl Into<String>, coordinates: Coordinates) {
        self.location_label = label.into();
        self.latitude = coordinates.latitude;
        self.longitude = coordinates.longitude;
    }

    /// Reset coordinates to the unset sentinel, keeping `label` for display.
    pub fn clear_location(&mut self, label: impl Into<String>) {
        self.set_location(label, Coordinates::UNSET);
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !INTERVAL_RANGE.contains(&self.interval_seconds) {
            result.add_error(
                "interval-seconds",
                format!(
                    "Must be between {} and {}, got {}",
                    INTERVAL_RANGE.start(),
                    INTERVAL_RANGE.end(),
                    self.interval_seconds
                ),
            );
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            result.add_error("latitude", "Latitude must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            result.add_error("longitude", "Longitude must be between -180 and 180");
        }

        // One sentinel component without the other is a half-written location
        if (self.latitude == 0.0) != (self.longitude == 0.0) {
            result.add_warning(
                "latitude/longitude",
                "Only one coordinate is 0.0; weather will still be fetched",
            );
        }

        if self.coordinates().is_unset() && !self.location_query.trim().is_empty() {
            result.add_warning("location-query", "Location has not been resolved yet");
        }

        result
    }
}

/// Settings storage errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Settings serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl SettingsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SettingsError::Io(_) => "Failed to save settings. Please try again.",
            SettingsError::Parse(_) => "Settings file is malformed. Using defaults.",
            SettingsError::Serialize(_) => "Failed to save settings. Please try again.",
        }
    }
}

/// Key-value settings capability provided by the host
pub trait SettingsStore: Send + Sync {
    /// Current settings
    fn get(&self) -> Settings;

    /// Replace all settings. Subscribers are notified only if something changed.
    fn set(&self, settings: Settings) -> Result<(), SettingsError>;

    /// Change notifications; the receiver starts at the current value.
    fn subscribe(&self) -> watch::Receiver<Settings>;

    /// Apply `f` to the current settings and store the result, with no other
    /// writer in between. `f` is called exactly once.
    fn update_with(&self, f: &mut dyn FnMut(&mut Settings)) -> Result<(), SettingsError>;
}

impl dyn SettingsStore {
    /// Atomic read-modify-write.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) -> Result<(), SettingsError> {
        let mut f = Some(f);
        self.update_with(&mut |settings| {
            if let Some(f) = f.take() {
                f(settings);
            }
        })
    }
}

/// Settings held in memory only
#[derive(Debug)]
pub struct MemorySettingsStore {
    tx: watch::Sender<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        let (tx, _rx) = watch::channel(settings);
        Self { tx }
    }

    /// Store the value and report whether it differed from the previous one.
    fn publish(&self, settings: Settings) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == settings {
                false
            } else {
                *current = settings;
                true
            }
        })
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Settings {
        self.tx.borrow().clone()
    }

    fn set(&self, settings: Settings) -> Result<(), SettingsError> {
        self.publish(settings);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    fn update_with(&self, f: &mut dyn FnMut(&mut Settings)) -> Result<(), SettingsError> {
        // The channel's write lock is held for the whole closure
        self.tx.send_if_modified(|current| {
            let before = current.clone();
            f(current);
            *current != before
        });
        Ok(())
    }
}

/// Settings persisted as TOML, written through on every change
#[derive(Debug)]
pub struct TomlSettingsStore {
    path: PathBuf,
    memory: MemorySettingsStore,
    write_lock: Mutex<()>,
}

impl TomlSettingsStore {
    /// Open the store at `path`; a missing file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            tracing::info!("No settings at {}, using defaults", path.display());
            Settings::default()
        };

        Ok(Self {
            path,
            memory: MemorySettingsStore::new(settings),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(settings)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self) -> Settings {
        self.memory.get()
    }

    fn set(&self, settings: Settings) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock();
        if self.memory.get() == settings {
            return Ok(());
        }
        self.write(&settings)?;
        self.memory.publish(settings);
        tracing::debug!("Settings saved to {}", self.path.display());
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Settings> {
        self.memory.subscribe()
    }

    fn update_with(&self, f: &mut dyn FnMut(&mut Settings)) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock();
        let before = self.memory.get();
        let mut settings = before.clone();
        f(&mut settings);
        if settings == before {
            return Ok(());
        }
        self.write(&settings)?;
        self.memory.publish(settings);
        tracing::debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}
