//! Clock/weather panel widget core.
//!
//! Alternates a clock with the latest weather on a host-owned label, refreshes
//! weather on a schedule, and backs the preferences window's location lookup.
//! The host injects its label ([`PanelLabel`]) and settings store
//! ([`clockweather_core::SettingsStore`]) and drives the lifecycle through
//! [`ClockWeather::start`] / [`ClockWeather::stop`].

pub mod alternation;
pub mod animation;
pub mod extension;
pub mod label;
pub mod prefs;
pub mod timer;
pub mod updater;

pub use alternation::{Alternator, DisplayMode};
pub use extension::{ClockWeather, ExtensionOptions};
pub use label::{clock_text, compose_text, LabelRenderer, PanelLabel, TransitionTiming, CLOCK_ICON};
pub use prefs::{LookupStatus, Preferences, PrefsOptions, NOT_FOUND_LABEL};
pub use updater::{UpdateOutcome, WeatherUpdater};
