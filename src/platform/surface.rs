//! Drawable areas

use glam::Vec2;

/// Something with a drawable area
pub trait Surface {
    /// Size in logical pixels
    fn size(&self) -> Vec2;
}

/// A surface of fixed size, for headless runs and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSurface {
    size: Vec2,
}

impl FixedSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
        }
    }
}

impl Surface for FixedSurface {
    fn size(&self) -> Vec2 {
        self.size
    }
}
