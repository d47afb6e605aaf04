//! Common entity capabilities
//!
//! Every simulated thing is built around a [`Body`]: position, velocity,
//! animation, hit points and flags. Player, enemies and bullets compose a
//! body and implement [`Entity`] for per-tick behaviour.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use glam::Vec2;

use super::bullet::Bullet;
use super::collision::Rect;
use crate::assets::{AnimationRegistry, Animator};
use crate::consts::FALLBACK_SPRITE_SIZE;
use crate::error::ValidationError;

/// Stable identity of an entity (also used as a non-owning back-reference)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out entity ids for one session
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Everything needed to build a [`Body`], validated once
#[derive(Debug, Clone)]
pub struct EntityConfig {
    pub animation_keys: BTreeSet<String>,
    pub initial_animation: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub max_hit_points: i32,
    pub current_hit_points: i32,
    pub collidable: bool,
    pub visible: bool,
}

impl EntityConfig {
    /// Config with one hit point, at the origin, collidable and visible
    pub fn new<I, S>(animation_keys: I, initial_animation: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            animation_keys: animation_keys.into_iter().map(Into::into).collect(),
            initial_animation: initial_animation.into(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            max_hit_points: 1,
            current_hit_points: 1,
            collidable: true,
            visible: true,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets both maximum and current hit points
    pub fn with_hit_points(mut self, hit_points: i32) -> Self {
        self.max_hit_points = hit_points;
        self.current_hit_points = hit_points;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.animation_keys.is_empty() {
            return Err(ValidationError::NoAnimationKeys);
        }
        if !self.animation_keys.contains(&self.initial_animation) {
            return Err(ValidationError::UnknownInitialAnimation(
                self.initial_animation.clone(),
            ));
        }
        if self.max_hit_points <= 0 {
            return Err(ValidationError::NonPositiveMaxHitPoints(self.max_hit_points));
        }
        if self.current_hit_points > self.max_hit_points {
            return Err(ValidationError::HitPointsExceedMax {
                current: self.current_hit_points,
                max: self.max_hit_points,
            });
        }
        Ok(())
    }
}

/// Shared entity state
#[derive(Debug, Clone)]
pub struct Body {
    id: EntityId,
    pub position: Vec2,
    /// Pixels per tick
    pub velocity: Vec2,
    max_hit_points: i32,
    current_hit_points: i32,
    pub collidable: bool,
    pub visible: bool,
    animation_keys: BTreeSet<String>,
    animator: Animator,
}

impl Body {
    pub fn new(
        id: EntityId,
        config: EntityConfig,
        animations: &AnimationRegistry,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        let animator = Animator::new(&config.initial_animation, animations);
        Ok(Self {
            id,
            position: config.position,
            velocity: config.velocity,
            max_hit_points: config.max_hit_points,
            current_hit_points: config.current_hit_points,
            collidable: config.collidable,
            visible: config.visible,
            animation_keys: config.animation_keys,
            animator,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn max_hit_points(&self) -> i32 {
        self.max_hit_points
    }

    pub fn current_hit_points(&self) -> i32 {
        self.current_hit_points
    }

    pub fn set_current_hit_points(&mut self, hit_points: i32) {
        self.current_hit_points = hit_points.min(self.max_hit_points);
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.current_hit_points -= damage.max(0);
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hit_points <= 0
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn animation_key(&self) -> &str {
        self.animator.key()
    }

    /// Switch animation; keys outside the entity's set are refused
    pub fn set_animation(&mut self, key: &str, animations: &AnimationRegistry) -> bool {
        if self.animator.key() == key {
            return true;
        }
        if !self.animation_keys.contains(key) {
            log::warn!("Entity {} has no animation <{key}>", self.id);
            return false;
        }
        self.animator = Animator::new(key, animations);
        true
    }

    /// Current sprite size (fallback square when the animation is missing)
    pub fn size(&self) -> Vec2 {
        self.animator
            .current_frame()
            .map(|f| f.size())
            .unwrap_or(Vec2::splat(FALLBACK_SPRITE_SIZE))
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size() / 2.0
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.position, self.size())
    }

    pub fn is_fully_outside(&self, area: &Rect) -> bool {
        !self.bounding_box().intersects(area)
    }

    /// Apply velocity and advance the animation
    pub fn advance(&mut self, dt: Duration) {
        self.position += self.velocity;
        self.animator.advance(dt);
    }

    /// Keep the bounding box inside `area`
    pub fn clamp_within(&mut self, area: &Rect) {
        let size = self.size();
        let max = (area.max() - size).max(area.min);
        self.position = self.position.clamp(area.min, max);
    }
}

/// Per-tick inputs shared by every entity update
pub struct TickContext<'a> {
    /// Time covered by this tick
    pub dt: Duration,
    /// Visible play area
    pub play_area: Rect,
    pub animations: &'a AnimationRegistry,
    pub ids: &'a mut IdAllocator,
    /// Bullets fired during this tick, flushed into the bullet repository
    pub spawned: &'a mut Vec<Bullet>,
    /// Player centre, once the player has moved this tick
    pub player_position: Option<Vec2>,
}

/// Something the loop updates each tick
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn update(&mut self, ctx: &mut TickContext<'_>);

    fn id(&self) -> EntityId {
        self.body().id()
    }
}
