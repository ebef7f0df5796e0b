use std::sync::Arc;

use anyhow::{Context, Result};
use clockweather_core::{Config, SettingsStore, TomlSettingsStore};
use clockweather_panel::{ClockWeather, ExtensionOptions, PanelLabel, Preferences, PrefsOptions};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints the panel text to stdout whenever it changes
#[derive(Default)]
struct TerminalLabel {
    text: Mutex<String>,
}

impl PanelLabel for TerminalLabel {
    fn text(&self) -> String {
        self.text.lock().clone()
    }

    fn set_text(&self, text: &str) {
        let mut current = self.text.lock();
        if *current != text {
            *current = text.to_string();
            println!("[panel] {}", text);
        }
    }

    // Opacity and offset have no terminal rendering
    fn set_opacity(&self, _opacity: u8) {}

    fn set_translation_y(&self, _y: f32) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    clockweather_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let settings: Arc<dyn SettingsStore> = Arc::new(
        TomlSettingsStore::open(config.settings_path())
            .context("Failed to open settings store")?,
    );

    tracing::info!("Clockweather started");
    println!("Clockweather - clock/weather panel");
    println!("  Config directory: {}", config.config_dir.display());
    println!("  Type a city name to set the location, Ctrl-C to quit\n");

    let label = Arc::new(TerminalLabel::default());
    let panel = ClockWeather::new(
        Arc::clone(&settings),
        label,
        ExtensionOptions::from(&config),
    );
    panel.start()?;

    let prefs = Preferences::new(Arc::clone(&settings), PrefsOptions::from(&config));
    let mut status = prefs.status();
    println!("Location: {}", prefs.current_status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(text)) => prefs.location_changed(text),
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                println!("Location: {}", current);
            }
        }
    }

    // Graceful shutdown
    panel.stop();
    tracing::info!("Clockweather stopped");

    Ok(())
}
