//! Enemy archetypes

use std::fmt;
use std::time::Duration;

use glam::Vec2;

use super::bullet::{BulletProfile, BulletSpawner, Team};
use super::entity::{Body, Entity, EntityConfig, EntityId, TickContext};
use crate::assets::AnimationRegistry;
use crate::consts::ENEMY_FIRE_INTERVAL_MS;
use crate::error::ValidationError;

/// The enemy kinds that can be spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyArchetype {
    RedMage,
    BlueMage,
    MagentaMage,
}

impl EnemyArchetype {
    pub const ALL: [EnemyArchetype; 3] = [
        EnemyArchetype::RedMage,
        EnemyArchetype::BlueMage,
        EnemyArchetype::MagentaMage,
    ];

    pub fn animation_key(&self) -> &'static str {
        match self {
            EnemyArchetype::RedMage => "mage-guardian-red",
            EnemyArchetype::BlueMage => "mage-guardian-blue",
            EnemyArchetype::MagentaMage => "mage-guardian-magenta",
        }
    }

    pub fn max_hit_points(&self) -> i32 {
        20
    }

    pub fn bullet_profile(&self) -> BulletProfile {
        let interval_ms = match self {
            EnemyArchetype::RedMage => ENEMY_FIRE_INTERVAL_MS,
            EnemyArchetype::BlueMage => ENEMY_FIRE_INTERVAL_MS * 3 / 4,
            EnemyArchetype::MagentaMage => ENEMY_FIRE_INTERVAL_MS * 5 / 4,
        };
        BulletProfile {
            fire_interval: Duration::from_millis(interval_ms),
            ..BulletProfile::enemy()
        }
    }
}

impl fmt::Display for EnemyArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnemyArchetype::RedMage => "red mage",
            EnemyArchetype::BlueMage => "blue mage",
            EnemyArchetype::MagentaMage => "magenta mage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    body: Body,
    archetype: EnemyArchetype,
    spawner: BulletSpawner,
    /// Last known player position
    target: Option<Vec2>,
}

impl Enemy {
    /// Build an enemy of `archetype` at `position` drifting sideways by
    /// `drift_x` pixels per tick
    pub fn spawn(
        id: EntityId,
        archetype: EnemyArchetype,
        position: Vec2,
        drift_x: f32,
        animations: &AnimationRegistry,
    ) -> Result<Self, ValidationError> {
        let key = archetype.animation_key();
        let config = EntityConfig::new([key], key)
            .with_position(position)
            .with_velocity(Vec2::new(drift_x, 0.0))
            .with_hit_points(archetype.max_hit_points());
        let body = Body::new(id, config, animations)?;
        let spawner = BulletSpawner::new(id, Team::Enemy, archetype.bullet_profile())?;
        Ok(Self {
            body,
            archetype,
            spawner,
            target: None,
        })
    }

    pub fn archetype(&self) -> EnemyArchetype {
        self.archetype
    }

    pub fn spawner(&self) -> &BulletSpawner {
        &self.spawner
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    /// Only fire at a target that is below
    fn has_shot(&self) -> bool {
        self.target
            .is_some_and(|target| target.y > self.body.center().y)
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) {
        if ctx.player_position.is_some() {
            self.target = ctx.player_position;
        }
        self.body.advance(ctx.dt);
        self.spawner.advance(ctx.dt);
        if self.has_shot() {
            self.spawner.try_fire(&self.body, ctx);
        }
    }
}
