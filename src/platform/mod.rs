//! Platform abstraction layer
//!
//! The seams between the simulation and whatever hosts it:
//! - Render surface and info panel sizes
//! - Sprite drawing
//! - Held-key input
//! - Fixed-interval tick source

pub mod input;
pub mod render;
pub mod surface;
pub mod timer;

pub use input::{HOLD_WINDOW, InputState, Key};
pub use render::{DrawContext, Sprite, SpriteKind};
pub use surface::{FixedSurface, Surface};
pub use timer::FixedTimer;
