//! Asset registries
//!
//! Loaded once, synchronously, before the loop starts. A failed entry is
//! permanent for the process lifetime; lookups for it return `None`.

pub mod animation;
pub mod audio;

pub use animation::{
    AnimationConfig, AnimationFrame, AnimationRegistry, AnimationTemplate, Animator,
    load_animations, slice_sprite_sheet,
};
pub use audio::{AudioClip, AudioManager, AudioRegistry, AudioSink, SilentSink, load_audio};

use crate::settings::Settings;

/// Load both registries from the locations named in `settings`
pub fn load_all(settings: &Settings) -> (AnimationRegistry, AudioRegistry) {
    let animation_dir = settings.animation_dir();
    let animations = load_animations(&animation_dir, &animation_dir.join(&settings.animation_config));

    let sound_dir = settings.sound_dir();
    let audio = load_audio(&sound_dir, &sound_dir.join(&settings.audio_config));

    log::info!(
        "Assets loaded: {} animations, {} audio clips",
        animations.len(),
        audio.len()
    );
    (animations, audio)
}
