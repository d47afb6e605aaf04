//! Bullets and the spawners that fire them

use std::time::Duration;

use glam::Vec2;

use super::cooldown::Cooldown;
use super::entity::{Body, Entity, EntityConfig, EntityId, TickContext};
use crate::assets::AnimationRegistry;
use crate::consts::{
    BULLET_SPEED, ENEMY_FIRE_INTERVAL_MS, FALLBACK_SPRITE_SIZE, PLAYER_FIRE_INTERVAL_MS,
};
use crate::error::ValidationError;

/// Side a bullet was fired for; decides who it can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Team {
    Player,
    Enemy,
}

/// A projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    body: Body,
    /// Firing entity, for attribution only
    owner: EntityId,
    team: Team,
    damage: i32,
}

impl Bullet {
    pub fn new(
        id: EntityId,
        config: EntityConfig,
        owner: EntityId,
        team: Team,
        damage: i32,
        animations: &AnimationRegistry,
    ) -> Result<Self, ValidationError> {
        if damage < 0 {
            return Err(ValidationError::NegativeDamage(damage));
        }
        Ok(Self {
            body: Body::new(id, config, animations)?,
            owner,
            team,
            damage,
        })
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn damage(&self) -> i32 {
        self.damage
    }
}

impl Entity for Bullet {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        self.body.advance(ctx.dt);
    }
}

/// Fixed firing profile of a spawner
#[derive(Debug, Clone, PartialEq)]
pub struct BulletProfile {
    pub damage: i32,
    /// Pixels per tick; positive travels up the screen
    pub speed_up: f32,
    pub animation_key: String,
    /// Minimum time between two shots
    pub fire_interval: Duration,
}

impl BulletProfile {
    pub fn player() -> Self {
        Self {
            damage: 1,
            speed_up: BULLET_SPEED,
            animation_key: "player-bullet".to_string(),
            fire_interval: Duration::from_millis(PLAYER_FIRE_INTERVAL_MS),
        }
    }

    pub fn enemy() -> Self {
        Self {
            damage: 1,
            speed_up: -BULLET_SPEED,
            animation_key: "enemy-bullet".to_string(),
            fire_interval: Duration::from_millis(ENEMY_FIRE_INTERVAL_MS),
        }
    }
}

/// Creates bullets for one owning entity
#[derive(Debug, Clone)]
pub struct BulletSpawner {
    owner: EntityId,
    team: Team,
    profile: BulletProfile,
    cooldown: Cooldown,
}

impl BulletSpawner {
    pub fn new(owner: EntityId, team: Team, profile: BulletProfile) -> Result<Self, ValidationError> {
        if profile.damage < 0 {
            return Err(ValidationError::NegativeDamage(profile.damage));
        }
        let cooldown = Cooldown::new(profile.fire_interval);
        Ok(Self {
            owner,
            team,
            profile,
            cooldown,
        })
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn profile(&self) -> &BulletProfile {
        &self.profile
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown.is_ready()
    }

    pub fn advance(&mut self, dt: Duration) {
        self.cooldown.advance(dt);
    }

    /// Build a bullet leaving `from`: centred horizontally, starting at the
    /// top edge when travelling up and at the bottom edge when travelling down
    pub fn spawn(&self, from: &Body, ctx: &mut TickContext<'_>) -> Result<Bullet, ValidationError> {
        let key = self.profile.animation_key.clone();
        let bullet_size = ctx
            .animations
            .get(&key)
            .and_then(|t| t.frames().first().map(|f| f.size()))
            .unwrap_or(Vec2::splat(FALLBACK_SPRITE_SIZE));

        let x = from.center().x - bullet_size.x / 2.0;
        let y = if self.profile.speed_up >= 0.0 {
            from.position.y - bullet_size.y
        } else {
            from.position.y + from.size().y
        };

        let config = EntityConfig::new([key.clone()], key)
            .with_position(Vec2::new(x, y))
            .with_velocity(Vec2::new(0.0, -self.profile.speed_up));

        Bullet::new(
            ctx.ids.next_id(),
            config,
            self.owner,
            self.team,
            self.profile.damage,
            ctx.animations,
        )
    }

    /// Fire if the cooldown allows; the bullet is queued on the context
    pub fn try_fire(&mut self, from: &Body, ctx: &mut TickContext<'_>) -> bool {
        if !self.cooldown.is_ready() {
            return false;
        }
        match self.spawn(from, ctx) {
            Ok(bullet) => {
                ctx.spawned.push(bullet);
                self.cooldown.arm();
                true
            }
            Err(e) => {
                log::error!("Spawner for {} could not fire: {e}", self.owner);
                false
            }
        }
    }
}
