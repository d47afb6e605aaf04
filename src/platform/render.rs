//! Drawing seam between the session and a front end

use crate::assets::AnimationFrame;
use crate::sim::{EnemyArchetype, Rect, Team};

/// What a sprite depicts; front ends without images draw by kind alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Player,
    Enemy(EnemyArchetype),
    Bullet(Team),
}

/// One visible entity for the current frame
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    pub kind: SpriteKind,
    /// Bounding box in play-area pixels
    pub bounds: Rect,
    /// Current animation frame, if the animation loaded
    pub frame: Option<&'a AnimationFrame>,
}

pub trait DrawContext {
    fn draw_sprite(&mut self, sprite: &Sprite<'_>);
}
