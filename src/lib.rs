//! Danmaku - a small bullet-hell arcade game
//!
//! Core modules:
//! - `sim`: Lifecycle state machine, entities, repositories and managers
//! - `session`: The game loop coordinator that owns one run
//! - `assets`: Animation and audio registries loaded from JSON configs
//! - `platform`: Render surface, drawing, input and tick-source seams
//! - `ui`: Pause menu / info panel collaborator
//! - `settings`: User configuration

pub mod assets;
pub mod error;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::{AssetError, SessionError, StateError, ValidationError};
pub use session::GameSession;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Default play area, in pixels
    pub const FRAME_WIDTH: f32 = 1024.0;
    pub const FRAME_HEIGHT: f32 = 720.0;

    /// Fixed tick interval (~60 Hz)
    pub const TICK_INTERVAL: Duration = Duration::from_micros(16_700);
    /// Maximum ticks run per pump to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Maximum number of enemies alive at once
    pub const MAX_ENEMY_COUNT: usize = 10;
    /// Minimum accumulated tick time between two enemy spawns
    pub const ENEMY_CREATION_COOLDOWN_MS: u64 = 5000;
    pub const ENEMY_CREATION_COOLDOWN: Duration =
        Duration::from_millis(ENEMY_CREATION_COOLDOWN_MS);
    /// Enemy horizontal drift is drawn from [-MAX, MAX] pixels per tick
    pub const MAX_ENEMY_DRIFT: i32 = 4;

    /// Sprite sheet frames are upscaled by this factor when sliced
    pub const SPRITE_SCALE: f32 = 1.5;
    /// Base frame time for animations: 1000 / 16 ms (integer frame period)
    pub const BASE_FRAME_TIME_MS: f64 = 1000.0 / 16.0;
    /// Size used for bounding boxes when an animation is missing
    pub const FALLBACK_SPRITE_SIZE: f32 = 32.0;

    /// Player defaults
    pub const PLAYER_MAX_HIT_POINTS: i32 = 20;
    /// Player movement speed (pixels per tick)
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Bullet speed (pixels per tick)
    pub const BULLET_SPEED: f32 = 20.0;
    pub const PLAYER_FIRE_INTERVAL_MS: u64 = 150;
    pub const ENEMY_FIRE_INTERVAL_MS: u64 = 1200;
}
