//! Centralized error types for the clock/weather panel.
//!
//! Library crates keep their own precise error enums; `AppError` gathers them
//! for hosts and offers `user_message()` for anything shown on screen.

use clockweather_weather::{FetchError, WeatherError};
use thiserror::Error;

use crate::settings::SettingsError;

/// Top-level error type for hosts embedding the panel.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Settings(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}
