//! Error types
//!
//! State guard violations are programming errors and panic (see
//! [`crate::sim::StateMachine::ensure_running`]); everything here is a value
//! callers are expected to handle or log.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::GameState;

/// Lifecycle state errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A transition that is not declared for the current state
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition { from: GameState, to: GameState },
    /// A state-gated operation called outside its required state
    #[error("cannot call {operation}() while {state}; requires {required}")]
    Precondition {
        operation: &'static str,
        state: GameState,
        required: &'static str,
    },
}

/// Entity construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("animation key set must not be empty")]
    NoAnimationKeys,
    #[error("initial animation `{0}` is not one of the entity's animation keys")]
    UnknownInitialAnimation(String),
    #[error("maximum hit points must be positive (got {0})")]
    NonPositiveMaxHitPoints(i32),
    #[error("current hit points {current} exceed maximum {max}")]
    HitPointsExceedMax { current: i32, max: i32 },
    #[error("bullet damage cannot be negative (got {0})")]
    NegativeDamage(i32),
}

/// Asset loading errors (always recovered by logging and skipping the entry)
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode sprite sheet {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid asset config for `{name}`: {reason}")]
    InvalidConfig { name: String, reason: &'static str },
    #[error("unsupported audio format in {} (expected RIFF/WAVE)", .0.display())]
    UnsupportedAudio(PathBuf),
}

/// Game session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0} surface must be provided")]
    MissingSurface(&'static str),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
