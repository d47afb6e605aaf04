//! The player-controlled character

use glam::Vec2;

use super::bullet::{BulletProfile, BulletSpawner, Team};
use super::collision::Rect;
use super::entity::{Body, Entity, EntityConfig, EntityId, TickContext};
use super::tick::TickInput;
use crate::assets::AnimationRegistry;
use crate::consts::{PLAYER_MAX_HIT_POINTS, PLAYER_SPEED};
use crate::error::ValidationError;

pub const PLAYER_IDLE: &str = "player-idle";
pub const PLAYER_WALK_UP: &str = "player-walk-up";
pub const PLAYER_WALK_UP_LEFT: &str = "player-walk-up-left";
pub const PLAYER_WALK_UP_RIGHT: &str = "player-walk-up-right";
pub const PLAYER_DEATH: &str = "player-death";

pub const PLAYER_ANIMATIONS: [&str; 5] = [
    PLAYER_IDLE,
    PLAYER_WALK_UP,
    PLAYER_WALK_UP_LEFT,
    PLAYER_WALK_UP_RIGHT,
    PLAYER_DEATH,
];

#[derive(Debug, Clone)]
pub struct Player {
    body: Body,
    spawner: Option<BulletSpawner>,
    firing: bool,
    intent: TickInput,
}

impl Player {
    /// Player centred horizontally, two sprite heights above the bottom edge
    pub fn new(
        id: EntityId,
        play_area: &Rect,
        animations: &AnimationRegistry,
    ) -> Result<Self, ValidationError> {
        let config = EntityConfig::new(PLAYER_ANIMATIONS, PLAYER_IDLE)
            .with_hit_points(PLAYER_MAX_HIT_POINTS);
        let mut body = Body::new(id, config, animations)?;

        let size = body.size();
        body.position = Vec2::new(
            play_area.min.x + play_area.width() / 2.0 - size.x / 2.0,
            play_area.min.y + play_area.height() - 2.0 * size.y,
        );

        Ok(Self {
            body,
            spawner: None,
            firing: false,
            intent: TickInput::default(),
        })
    }

    /// Attach the standard player spawner
    pub fn with_default_spawner(mut self) -> Result<Self, ValidationError> {
        let spawner = BulletSpawner::new(self.id(), Team::Player, BulletProfile::player())?;
        self.set_spawner(spawner);
        Ok(self)
    }

    pub fn spawner(&self) -> Option<&BulletSpawner> {
        self.spawner.as_ref()
    }

    pub fn set_spawner(&mut self, spawner: BulletSpawner) {
        self.spawner = Some(spawner);
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    /// Start or stop firing; always false without a spawner
    pub fn set_firing(&mut self, firing: bool) {
        self.firing = firing && self.spawner.is_some();
    }

    pub fn intent(&self) -> TickInput {
        self.intent
    }

    pub fn apply_input(&mut self, input: TickInput) {
        self.intent = input;
        self.set_firing(input.fire);
    }

    fn choose_animation(&self) -> &'static str {
        if self.body.is_defeated() {
            return PLAYER_DEATH;
        }
        let axis = self.intent.axis();
        if axis == Vec2::ZERO {
            PLAYER_IDLE
        } else if axis.x < 0.0 {
            PLAYER_WALK_UP_LEFT
        } else if axis.x > 0.0 {
            PLAYER_WALK_UP_RIGHT
        } else {
            PLAYER_WALK_UP
        }
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        let key = self.choose_animation();
        self.body.set_animation(key, ctx.animations);

        if self.body.is_defeated() {
            self.body.velocity = Vec2::ZERO;
            self.body.advance(ctx.dt);
            return;
        }

        self.body.velocity = self.intent.axis() * PLAYER_SPEED;
        self.body.advance(ctx.dt);
        self.body.clamp_within(&ctx.play_area);

        if let Some(spawner) = self.spawner.as_mut() {
            spawner.advance(ctx.dt);
            if self.firing {
                spawner.try_fire(&self.body, ctx);
            }
        }
    }
}
