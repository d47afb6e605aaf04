//! Game settings and preferences
//!
//! Read from a JSON file next to the binary; anything missing falls back to
//! the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_HEIGHT, FRAME_WIDTH, TICK_INTERVAL};

/// Default settings file name
pub const SETTINGS_FILE: &str = "danmaku_settings.json";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Play area ===
    /// Logical play-area width in pixels
    pub play_width: f32,
    /// Logical play-area height in pixels
    pub play_height: f32,

    // === Loop ===
    /// Tick interval in milliseconds
    pub tick_interval_ms: f64,
    /// RNG seed; random per run when absent
    pub seed: Option<u64>,

    // === Assets ===
    /// Root directory holding `images/animations/` and `sounds/`
    pub asset_dir: PathBuf,
    /// Animation config file name inside the animations directory
    pub animation_config: String,
    /// Audio config file name inside the sounds directory
    pub audio_config: String,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            play_width: FRAME_WIDTH,
            play_height: FRAME_HEIGHT,

            tick_interval_ms: TICK_INTERVAL.as_micros() as f64 / 1000.0,
            seed: None,

            asset_dir: PathBuf::from("assets"),
            animation_config: "animations_config.json".to_string(),
            audio_config: "audio_config.json".to_string(),

            master_volume: 0.8,
            music_volume: 0.7,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or malformed
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Tick interval as a duration (never zero)
    pub fn tick_interval(&self) -> Duration {
        if self.tick_interval_ms.is_finite() && self.tick_interval_ms > 0.0 {
            Duration::from_micros((self.tick_interval_ms * 1000.0).round().max(1.0) as u64)
        } else {
            TICK_INTERVAL
        }
    }

    /// Effective music volume (master * music)
    pub fn effective_music_volume(&self) -> f32 {
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Effective sound effects volume (master * sfx)
    pub fn effective_sfx_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    pub fn animation_dir(&self) -> PathBuf {
        self.asset_dir.join("images").join("animations")
    }

    pub fn sound_dir(&self) -> PathBuf {
        self.asset_dir.join("sounds")
    }

    fn sanitized(mut self) -> Self {
        if !(self.play_width > 0.0 && self.play_height > 0.0) {
            log::warn!("Play area must be positive, using defaults");
            self.play_width = FRAME_WIDTH;
            self.play_height = FRAME_HEIGHT;
        }
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"seed": 7, "muted": true}"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert!(settings.muted);
        assert_eq!(settings.play_width, FRAME_WIDTH);
        assert_eq!(settings.tick_interval(), TICK_INTERVAL);
    }

    #[test]
    fn test_sanitize() {
        let settings = Settings {
            play_width: -5.0,
            master_volume: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.play_width, FRAME_WIDTH);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_bad_tick_interval_falls_back() {
        let settings = Settings {
            tick_interval_ms: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.tick_interval(), TICK_INTERVAL);
    }

    #[test]
    fn test_missing_file_is_default() {
        let settings = Settings::load(Path::new("/definitely/not/here.json"));
        assert_eq!(settings, Settings::default());
    }
}
