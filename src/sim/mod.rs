//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod bullet;
pub mod collision;
pub mod cooldown;
pub mod enemy;
pub mod entity;
pub mod manager;
pub mod player;
pub mod repository;
pub mod state;
pub mod tick;

pub use bullet::{Bullet, BulletProfile, BulletSpawner, Team};
pub use collision::{HitReport, Rect, resolve_hits};
pub use cooldown::Cooldown;
pub use enemy::{Enemy, EnemyArchetype};
pub use entity::{Body, Entity, EntityConfig, EntityId, IdAllocator, TickContext};
pub use manager::{BulletManager, EnemyManager};
pub use player::{PLAYER_ANIMATIONS, Player};
pub use repository::{BulletRepository, EnemyRepository, Repository};
pub use state::{GameState, StateMachine};
pub use tick::TickInput;
