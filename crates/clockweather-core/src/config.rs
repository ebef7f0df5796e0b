use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use clockweather_weather::{fetch::USER_AGENT, geocode::GEOCODING_URL, provider::FORECAST_URL};

use crate::error::ConfigError;

/// A single validation finding
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config or settings validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Host configuration for the panel. User-editable preferences live in
/// [`crate::Settings`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `config.toml` and `settings.toml`
    pub config_dir: PathBuf,

    /// Remote endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// Panel timing
    #[serde(default)]
    pub panel: PanelConfig,

    /// Preferences behaviour
    #[serde(default)]
    pub prefs: PrefsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub forecast_url: String,
    pub geocoding_url: String,
    /// Sent with every forecast and geocoding request
    pub user_agent: String,
    /// Per-request timeout; 0 keeps the transport default
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: FORECAST_URL.to_string(),
            geocoding_url: GEOCODING_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout_secs: 0,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Weather refresh period
    pub weather_refresh_secs: u64,
    /// Length of each fade/slide phase
    pub transition_ms: u64,
    /// Animation frame spacing
    pub frame_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            weather_refresh_secs: 900,
            transition_ms: 160,
            frame_ms: 16,
        }
    }
}

impl PanelConfig {
    pub fn weather_refresh(&self) -> Duration {
        Duration::from_secs(self.weather_refresh_secs)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefsConfig {
    /// Quiet period after the last location edit before looking it up
    pub debounce_ms: u64,
}

impl Default for PrefsConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

impl PrefsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            api: ApiConfig::default(),
            panel: PanelConfig::default(),
            prefs: PrefsConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clockweather")
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self {
                config_dir: path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(default_config_dir),
                ..Self::default()
            };
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Logs warnings; returns an error if validation finds critical problems.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.api.forecast_url, "api.forecast_url", &mut result);
        self.validate_url(&self.api.geocoding_url, "api.geocoding_url", &mut result);

        if self.api.user_agent.trim().is_empty() {
            result.add_error("api.user_agent", "User agent must not be empty");
        }

        if self.api.request_timeout_secs > 300 {
            result.add_warning(
                "api.request_timeout_secs",
                "Request timeout is unusually long (>5 minutes)",
            );
        }

        if self.panel.weather_refresh_secs == 0 {
            result.add_error(
                "panel.weather_refresh_secs",
                "Weather refresh interval must be greater than 0",
            );
        } else if self.panel.weather_refresh_secs > 86_400 {
            result.add_warning(
                "panel.weather_refresh_secs",
                "Weather refresh interval is more than 24 hours",
            );
        }

        if self.panel.frame_ms == 0 {
            result.add_error("panel.frame_ms", "Frame spacing must be greater than 0");
        }
        if self.panel.transition_ms > 2_000 {
            result.add_warning(
                "panel.transition_ms",
                "Transition is longer than 2 seconds",
            );
        }

        if self.prefs.debounce_ms == 0 {
            result.add_warning(
                "prefs.debounce_ms",
                "Debounce disabled; every keystroke triggers a lookup",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.query().is_some() {
                    result.add_error(field_name, "URL must not carry a query string");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.config_dir.join("config.toml"))
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Where the settings store lives
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.toml")
    }
}
