//! Game settings and tuning
//!
//! Persisted in LocalStorage on the web; read from a JSON file on native.

use serde::{Deserialize, Serialize};

use crate::consts::{END_DELAY_SECS, MAX_POWER, MIN_POWER};
#[cfg(not(target_arch = "wasm32"))]
use crate::error::SettingsError;

/// Longest accepted end delay
const MAX_END_DELAY_SECS: f32 = 60.0;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Shooting ===
    /// Launch impulse for the shortest drag
    pub min_power: f32,
    /// Launch impulse for a full-length drag
    pub max_power: f32,
    /// Debug: shots are never consumed
    pub infinite_shots: bool,

    // === Flow ===
    /// Seconds between a level ending and the restart/advance prompt
    pub end_delay_secs: f32,
    /// Level to start on
    pub start_level: u32,

    // === Display ===
    /// Frame rate the native loop paces itself to
    pub target_frame_rate: f32,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_power: MIN_POWER,
            max_power: MAX_POWER,
            infinite_shots: false,

            end_delay_secs: END_DELAY_SECS,
            start_level: 1,

            target_frame_rate: 60.0,
            show_fps: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ball_game_settings";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Clamp values that would break the simulation
    pub fn sanitized(mut self) -> Self {
        if !self.min_power.is_finite() || self.min_power < 0.0 {
            self.min_power = MIN_POWER;
        }
        if !self.max_power.is_finite() || self.max_power < self.min_power {
            self.max_power = self.min_power.max(MAX_POWER);
        }
        if !self.end_delay_secs.is_finite() || self.end_delay_secs < 0.0 {
            self.end_delay_secs = END_DELAY_SECS;
        }
        self.end_delay_secs = self.end_delay_secs.min(MAX_END_DELAY_SECS);
        if !self.target_frame_rate.is_finite() || self.target_frame_rate < 1.0 {
            self.target_frame_rate = 60.0;
        }
        if self.start_level == 0 {
            self.start_level = 1;
        }
        self
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
