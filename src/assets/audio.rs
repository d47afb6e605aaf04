//! Audio clips, their registry, and a small playback manager
//!
//! Decoding and mixing belong to whatever [`AudioSink`] the front end
//! provides; this module only loads clips, validates their container, and
//! decides what should be playing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;

use crate::error::AssetError;

/// Battle music started with every run
pub const BATTLE_MUSIC: &str = "goblinsDance";
/// Music looping on the main menu
pub const MENU_MUSIC: &str = "goblinsDen";

/// A loaded clip (raw WAV bytes)
#[derive(Debug, Clone)]
pub struct AudioClip {
    key: String,
    path: PathBuf,
    data: Rc<[u8]>,
}

impl AudioClip {
    /// Wrap raw bytes, rejecting anything that is not a RIFF/WAVE container
    pub fn from_wav_bytes(key: &str, path: PathBuf, data: Vec<u8>) -> Result<Self, AssetError> {
        if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
            return Err(AssetError::UnsupportedAudio(path));
        }
        Ok(Self {
            key: key.to_string(),
            path,
            data: data.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Key-addressed store of audio clips, filled once at startup
#[derive(Debug, Clone, Default)]
pub struct AudioRegistry {
    clips: HashMap<String, Rc<AudioClip>>,
}

impl AudioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// First registration wins
    pub fn register(&mut self, clip: AudioClip) -> bool {
        if self.clips.contains_key(clip.key()) {
            return false;
        }
        self.clips.insert(clip.key().to_string(), Rc::new(clip));
        true
    }

    pub fn get(&self, key: &str) -> Option<Rc<AudioClip>> {
        self.clips.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// One entry of the audio config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub key: String,
    pub file_name: String,
}

/// Load every clip listed in `config_path`; failures are logged and skipped
pub fn load_audio(dir: &Path, config_path: &Path) -> AudioRegistry {
    let mut registry = AudioRegistry::new();

    let configs: Vec<AudioConfig> = match std::fs::read_to_string(config_path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(configs) => configs,
            Err(e) => {
                log::error!("Invalid JSON in {}: {e}", config_path.display());
                return registry;
            }
        },
        Err(e) => {
            log::error!("Failed to read {}: {e}", config_path.display());
            return registry;
        }
    };

    for config in configs {
        match load_clip(dir, &config) {
            Ok(clip) => {
                log::info!("Loaded audio clip <{}>", clip.key());
                registry.register(clip);
            }
            Err(e) => log::error!("Failed to load clip {}: {e}", config.file_name),
        }
    }
    registry
}

fn load_clip(dir: &Path, config: &AudioConfig) -> Result<AudioClip, AssetError> {
    if config.key.trim().is_empty() {
        return Err(AssetError::InvalidConfig {
            name: config.file_name.clone(),
            reason: "key cannot be blank",
        });
    }
    let path = dir.join(&config.file_name);
    let data = std::fs::read(&path).map_err(|source| AssetError::Io {
        path: path.clone(),
        source,
    })?;
    AudioClip::from_wav_bytes(&config.key, path, data)
}

/// Output device seam
pub trait AudioSink {
    fn play(&mut self, clip: &AudioClip, looping: bool, volume: f32);
    fn pause(&mut self, key: &str);
    fn resume(&mut self, key: &str);
    fn stop(&mut self, key: &str);
}

/// Sink that only logs (headless runs and tests)
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, clip: &AudioClip, looping: bool, volume: f32) {
        log::debug!("play <{}> looping={looping} volume={volume:.2}", clip.key());
    }

    fn pause(&mut self, key: &str) {
        log::debug!("pause <{key}>");
    }

    fn resume(&mut self, key: &str) {
        log::debug!("resume <{key}>");
    }

    fn stop(&mut self, key: &str) {
        log::debug!("stop <{key}>");
    }
}

/// Decides what plays; missing clips are logged and skipped
pub struct AudioManager {
    registry: AudioRegistry,
    sink: Box<dyn AudioSink>,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
    current_music: Option<String>,
    music_paused: bool,
    /// The sink was told to play `current_music` and has not been stopped
    music_in_sink: bool,
}

impl AudioManager {
    pub fn new(registry: AudioRegistry, sink: Box<dyn AudioSink>) -> Self {
        Self {
            registry,
            sink,
            music_volume: 0.7,
            sfx_volume: 1.0,
            muted: false,
            current_music: None,
            music_paused: false,
            music_in_sink: false,
        }
    }

    /// Silent manager with no clips
    pub fn silent() -> Self {
        Self::new(AudioRegistry::new(), Box::new(SilentSink))
    }

    pub fn set_volumes(&mut self, music: f32, sfx: f32) {
        self.music_volume = music.clamp(0.0, 1.0);
        self.sfx_volume = sfx.clamp(0.0, 1.0);
    }

    /// Muting stops the music in the sink; unmuting starts it again unless
    /// it is paused
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted == muted {
            return;
        }
        self.muted = muted;
        if muted {
            if let Some(key) = self.current_music.as_deref().filter(|_| self.music_in_sink) {
                self.sink.stop(key);
                self.music_in_sink = false;
            }
        } else if !self.music_paused {
            self.start_current_music();
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn registry(&self) -> &AudioRegistry {
        &self.registry
    }

    pub fn current_music(&self) -> Option<&str> {
        self.current_music.as_deref()
    }

    /// Start looping `key`, replacing whatever music was playing
    pub fn play_music(&mut self, key: &str) -> bool {
        self.stop_music();
        let Some(clip) = self.registry.get(key) else {
            log::warn!("Audio clip <{key}> not found, no music will play");
            return false;
        };
        self.current_music = Some(clip.key().to_string());
        if !self.muted {
            self.sink.play(&clip, true, self.music_volume);
            self.music_in_sink = true;
        }
        true
    }

    pub fn pause_music(&mut self) {
        let Some(key) = &self.current_music else {
            return;
        };
        if self.music_paused {
            return;
        }
        self.music_paused = true;
        if self.music_in_sink {
            self.sink.pause(key);
        }
    }

    pub fn resume_music(&mut self) {
        let Some(key) = &self.current_music else {
            return;
        };
        if !self.music_paused {
            return;
        }
        self.music_paused = false;
        if self.music_in_sink {
            self.sink.resume(key);
        } else if !self.muted {
            self.start_current_music();
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(key) = self.current_music.take() {
            if self.music_in_sink {
                self.sink.stop(&key);
            }
        }
        self.music_paused = false;
        self.music_in_sink = false;
    }

    fn start_current_music(&mut self) {
        let Some(clip) = self.current_music.as_deref().and_then(|key| self.registry.get(key)) else {
            return;
        };
        self.sink.play(&clip, true, self.music_volume);
        self.music_in_sink = true;
    }

    pub fn play_effect(&mut self, key: &str) -> bool {
        let Some(clip) = self.registry.get(key) else {
            log::warn!("Audio clip <{key}> not found");
            return false;
        };
        if !self.muted {
            self.sink.play(&clip, false, self.sfx_volume);
        }
        true
    }
}
