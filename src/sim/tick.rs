//! Per-tick player commands

use glam::Vec2;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal intent, -1 (left) to 1 (right)
    pub move_x: f32,
    /// Vertical intent, -1 (up) to 1 (down)
    pub move_y: f32,
    /// Fire while held
    pub fire: bool,
}

impl TickInput {
    /// Movement axis, clamped to the unit box
    pub fn axis(&self) -> Vec2 {
        Vec2::new(self.move_x, self.move_y).clamp(Vec2::NEG_ONE, Vec2::ONE)
    }

    pub fn is_moving(&self) -> bool {
        self.axis() != Vec2::ZERO
    }
}
