pub mod config;
pub mod error;
pub mod settings;

pub use config::{ApiConfig, Config, PanelConfig, PrefsConfig, ValidationResult};
pub use error::{AppError, ConfigError};
pub use settings::{
    MemorySettingsStore, Settings, SettingsError, SettingsStore, TomlSettingsStore, INTERVAL_RANGE,
};

use anyhow::Result;

/// Install the tracing subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Safe to call more than once; a
/// subscriber installed by the host wins.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Clockweather core initialized");
    }
    Ok(())
}
