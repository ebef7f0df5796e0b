//! Shared test doubles for panel integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use clockweather_core::{MemorySettingsStore, Settings, SettingsStore};
use clockweather_panel::PanelLabel;
use parking_lot::Mutex;

/// Host label double that records every text it was given
#[derive(Default)]
pub struct RecordingLabel {
    texts: Mutex<Vec<String>>,
    opacity: Mutex<u8>,
}

impl RecordingLabel {
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().clone()
    }

    pub fn opacity(&self) -> u8 {
        *self.opacity.lock()
    }
}

impl PanelLabel for RecordingLabel {
    fn text(&self) -> String {
        self.texts.lock().last().cloned().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.texts.lock().push(text.to_string());
    }

    fn set_opacity(&self, opacity: u8) {
        *self.opacity.lock() = opacity;
    }

    fn set_translation_y(&self, _y: f32) {}
}

pub fn store(settings: Settings) -> Arc<dyn SettingsStore> {
    Arc::new(MemorySettingsStore::new(settings))
}

pub fn located(latitude: f64, longitude: f64) -> Settings {
    Settings {
        location_query: "Berlin".to_string(),
        location_label: "Berlin, Germany".to_string(),
        latitude,
        longitude,
        ..Settings::default()
    }
}

pub fn forecast_body(temperature: f64, weathercode: i64) -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.0,
        "longitude": 13.0,
        "current_weather": {
            "temperature": temperature,
            "weathercode": weathercode,
            "windspeed": 11.2
        }
    })
}
