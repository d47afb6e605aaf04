//! Per-kind orchestration around the repositories
//!
//! Each manager owns its repository and runs, once per tick and in this
//! order: spawn policy, per-entity update, cleanup.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::bullet::Bullet;
use super::collision::{HitReport, Rect, resolve_hits};
use super::cooldown::Cooldown;
use super::enemy::{Enemy, EnemyArchetype};
use super::entity::{Entity, EntityId, TickContext};
use super::player::Player;
use super::repository::{BulletRepository, EnemyRepository};
use super::state::StateMachine;
use crate::consts::{ENEMY_CREATION_COOLDOWN, MAX_ENEMY_COUNT, MAX_ENEMY_DRIFT};

/// Spawns, updates and culls enemies
#[derive(Debug, Clone)]
pub struct EnemyManager {
    repository: EnemyRepository,
    rng: Pcg32,
    cooldown: Cooldown,
    spawned_total: u64,
}

impl EnemyManager {
    pub fn new(seed: u64) -> Self {
        Self {
            repository: EnemyRepository::new(),
            rng: Pcg32::seed_from_u64(seed),
            cooldown: Cooldown::new(ENEMY_CREATION_COOLDOWN),
            spawned_total: 0,
        }
    }

    /// Empty the repository, disarm the creation cooldown and reseed
    pub fn init(&mut self, seed: u64) {
        self.repository.clear();
        self.cooldown.reset();
        self.rng = Pcg32::seed_from_u64(seed);
        self.spawned_total = 0;
    }

    pub fn repository(&self) -> &EnemyRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut EnemyRepository {
        &mut self.repository
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    /// Enemies created by [`Self::create_random_enemy`] since the last init
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    #[track_caller]
    pub fn can_create_enemy(&self, state: &StateMachine) -> bool {
        state.ensure_running("can_create_enemy");
        let count = self.repository.len(state);
        log::trace!(
            "Enemies: {count} | cooldown elapsed: {:?} | on cooldown: {}",
            self.cooldown.elapsed(),
            self.cooldown.is_active()
        );
        count < MAX_ENEMY_COUNT && self.cooldown.is_ready()
    }

    /// Insert a pre-built enemy when creation is currently allowed
    #[track_caller]
    pub fn add_enemy(&mut self, state: &StateMachine, enemy: Enemy) -> bool {
        state.ensure_running("add_enemy");
        self.can_create_enemy(state) && self.repository.add(state, enemy)
    }

    /// Spawn one enemy of a random archetype if allowed, arming the cooldown
    #[track_caller]
    pub fn create_random_enemy(
        &mut self,
        state: &StateMachine,
        ctx: &mut TickContext<'_>,
    ) -> Option<EntityId> {
        state.ensure_running("create_random_enemy");
        if !self.can_create_enemy(state) {
            return None;
        }

        let archetype = EnemyArchetype::ALL[self.rng.random_range(0..EnemyArchetype::ALL.len())];
        let position = self.random_spawn_point(&ctx.play_area);
        let drift = self.rng.random_range(-MAX_ENEMY_DRIFT..=MAX_ENEMY_DRIFT) as f32;

        let mut enemy = match Enemy::spawn(ctx.ids.next_id(), archetype, position, drift, ctx.animations) {
            Ok(enemy) => enemy,
            Err(e) => {
                log::error!("Failed to spawn {archetype}: {e}");
                return None;
            }
        };
        enemy.set_target(ctx.player_position);

        let id = enemy.id();
        if !self.repository.add(state, enemy) {
            return None;
        }
        self.cooldown.arm();
        self.spawned_total += 1;
        log::debug!("Spawned {archetype} {id} at ({:.0}, {:.0})", position.x, position.y);
        Some(id)
    }

    /// Advance the cooldown, maybe spawn, update every enemy, then cull
    #[track_caller]
    pub fn update(&mut self, state: &StateMachine, ctx: &mut TickContext<'_>) {
        state.ensure_running("update");
        self.cooldown.advance(ctx.dt);
        self.create_random_enemy(state, ctx);
        for enemy in self.repository.iter_mut(state) {
            enemy.update(ctx);
        }
        self.cleanup(state, &ctx.play_area);
    }

    /// Remove enemies that left the play area or ran out of hit points
    #[track_caller]
    pub fn cleanup(&mut self, state: &StateMachine, play_area: &Rect) -> usize {
        self.repository
            .remove_if(state, |e| e.body().is_fully_outside(play_area) || e.body().is_defeated())
    }

    /// x across the frame height, y within 20%..60% of it
    fn random_spawn_point(&mut self, play_area: &Rect) -> Vec2 {
        let h = play_area.height().max(1.0);
        let x = self.rng.random_range(0.0..h);
        let y = self.rng.random_range(h * 0.2..h * 0.6);
        play_area.min + Vec2::new(x, y)
    }
}

/// Updates bullets, resolves their hits and culls them
#[derive(Debug, Clone, Default)]
pub struct BulletManager {
    repository: BulletRepository,
}

impl BulletManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self) {
        self.repository.clear();
    }

    pub fn repository(&self) -> &BulletRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut BulletRepository {
        &mut self.repository
    }

    #[track_caller]
    pub fn add_bullet(&mut self, state: &StateMachine, bullet: Bullet) -> bool {
        self.repository.add(state, bullet)
    }

    /// Move every bullet, apply hits, then drop bullets that left the area
    #[track_caller]
    pub fn update(
        &mut self,
        state: &StateMachine,
        ctx: &mut TickContext<'_>,
        player: Option<&mut Player>,
        enemies: &mut EnemyRepository,
    ) -> HitReport {
        state.ensure_running("update");
        for bullet in self.repository.iter_mut(state) {
            bullet.update(ctx);
        }
        let report = resolve_hits(state, &mut self.repository, player, enemies);
        self.cleanup(state, &ctx.play_area);
        report
    }

    #[track_caller]
    pub fn cleanup(&mut self, state: &StateMachine, play_area: &Rect) -> usize {
        self.repository
            .remove_if(state, |b| b.body().is_fully_outside(play_area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::assets::AnimationRegistry;
    use crate::assets::animation::tests::registry_with;
    use crate::sim::bullet::Team;
    use crate::sim::entity::{EntityConfig, IdAllocator};
    use proptest::prelude::*;

    fn running() -> StateMachine {
        let mut state = StateMachine::new();
        state.start_initialization().unwrap();
        state.start_running().unwrap();
        state
    }

    fn area() -> Rect {
        Rect::from_size(Vec2::new(1024.0, 720.0))
    }

    struct Harness {
        registry: AnimationRegistry,
        ids: IdAllocator,
        spawned: Vec<Bullet>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                registry: AnimationRegistry::new(),
                ids: IdAllocator::new(),
                spawned: Vec::new(),
            }
        }

        fn ctx(&mut self, dt: Duration) -> TickContext<'_> {
            TickContext {
                dt,
                play_area: area(),
                animations: &self.registry,
                ids: &mut self.ids,
                spawned: &mut self.spawned,
                player_position: None,
            }
        }
    }

    #[test]
    fn test_first_update_spawns_then_cooldown_holds() {
        let state = running();
        let mut manager = EnemyManager::new(7);
        let mut h = Harness::new();

        manager.update(&state, &mut h.ctx(Duration::from_millis(16)));
        assert_eq!(manager.repository().len(&state), 1);
        assert!(manager.cooldown().is_active());

        manager.update(&state, &mut h.ctx(Duration::from_millis(4999)));
        assert_eq!(manager.repository().len(&state), 1);

        manager.update(&state, &mut h.ctx(Duration::from_millis(1)));
        assert_eq!(manager.repository().len(&state), 2);
        assert_eq!(manager.spawned_total(), 2);
    }

    #[test]
    fn test_spawn_point_in_band() {
        let state = running();
        let mut manager = EnemyManager::new(99);
        let mut h = Harness::new();
        for _ in 0..10 {
            let id = manager
                .create_random_enemy(&state, &mut h.ctx(Duration::ZERO))
                .unwrap();
            let pos = manager.repository().get(&state, id).unwrap().body().position;
            assert!((0.0..720.0).contains(&pos.x));
            assert!((144.0..432.0).contains(&pos.y));
            manager.cooldown.reset();
        }
        assert_eq!(manager.repository().len(&state), MAX_ENEMY_COUNT);
        assert!(!manager.can_create_enemy(&state));
    }

    #[test]
    fn test_same_seed_same_enemies() {
        let state = running();
        let spawn = |seed| {
            let mut manager = EnemyManager::new(seed);
            let mut h = Harness::new();
            let id = manager
                .create_random_enemy(&state, &mut h.ctx(Duration::ZERO))
                .unwrap();
            let enemy = manager.repository().get(&state, id).unwrap();
            (enemy.archetype(), enemy.body().position, enemy.body().velocity)
        };
        assert_eq!(spawn(42), spawn(42));
    }

    #[test]
    fn test_defeated_enemy_removed_regardless_of_position() {
        let state = running();
        let mut manager = EnemyManager::new(1);
        let mut h = Harness::new();
        let mut enemy = Enemy::spawn(
            EntityId(500),
            EnemyArchetype::RedMage,
            Vec2::new(400.0, 300.0),
            0.0,
            &h.registry,
        )
        .unwrap();
        enemy.body_mut().take_damage(20);
        assert!(manager.add_enemy(&state, enemy));

        manager.update(&state, &mut h.ctx(Duration::from_millis(16)));
        assert!(manager.repository().get(&state, EntityId(500)).is_none());
    }

    #[test]
    fn test_init_resets() {
        let state = running();
        let mut manager = EnemyManager::new(3);
        let mut h = Harness::new();
        manager.update(&state, &mut h.ctx(Duration::from_millis(16)));
        manager.init(3);
        assert!(manager.repository().is_empty());
        assert!(manager.can_create_enemy(&state));
    }

    #[test]
    #[should_panic(expected = "cannot call update() while PAUSED")]
    fn test_update_while_paused_panics() {
        let mut state = running();
        state.pause();
        let mut h = Harness::new();
        EnemyManager::new(1).update(&state, &mut h.ctx(Duration::from_millis(16)));
    }

    #[test]
    fn test_outside_bullet_removed() {
        let state = running();
        let mut bullets = BulletManager::new();
        let mut enemies = EnemyRepository::new();
        let mut h = Harness::new();
        let cfg = EntityConfig::new(["b"], "b").with_position(Vec2::new(-100.0, -100.0));
        let bullet = Bullet::new(EntityId(1), cfg, EntityId(0), Team::Player, 1, &h.registry).unwrap();
        assert!(bullets.add_bullet(&state, bullet));

        bullets.update(&state, &mut h.ctx(Duration::from_millis(16)), None, &mut enemies);
        assert!(bullets.repository().is_empty());
    }

    #[test]
    fn test_bullet_hits_enemy_once() {
        let state = running();
        let registry = registry_with(&["mage-guardian-red", "b"], 40);
        let mut bullets = BulletManager::new();
        let mut enemies = EnemyRepository::new();
        let enemy = Enemy::spawn(EntityId(10), EnemyArchetype::RedMage, Vec2::new(100.0, 100.0), 0.0, &registry)
            .unwrap();
        enemies.add(&state, enemy);
        for id in [1, 2] {
            let cfg = EntityConfig::new(["b"], "b").with_position(Vec2::new(110.0, 110.0));
            let bullet = Bullet::new(EntityId(id), cfg, EntityId(0), Team::Player, 5, &registry).unwrap();
            bullets.add_bullet(&state, bullet);
        }
        let enemy_shot = {
            let cfg = EntityConfig::new(["b"], "b").with_position(Vec2::new(110.0, 110.0));
            Bullet::new(EntityId(3), cfg, EntityId(10), Team::Enemy, 5, &registry).unwrap()
        };
        bullets.add_bullet(&state, enemy_shot);

        let mut ids = IdAllocator::new();
        let mut spawned = Vec::new();
        let mut ctx = TickContext {
            dt: Duration::from_millis(16),
            play_area: area(),
            animations: &registry,
            ids: &mut ids,
            spawned: &mut spawned,
            player_position: None,
        };
        let report = bullets.update(&state, &mut ctx, None, &mut enemies);
        assert_eq!(report.bullets_spent, 2);
        assert_eq!(report.player_damage, 0);
        assert_eq!(
            enemies.get(&state, EntityId(10)).unwrap().body().current_hit_points(),
            10
        );
        // The enemy's own bullet passes through it
        assert_eq!(bullets.repository().len(&state), 1);
    }

    proptest! {
        #[test]
        fn prop_never_more_than_max_enemies(dts in prop::collection::vec(0u64..8000, 1..120), seed in any::<u64>()) {
            let state = running();
            let mut manager = EnemyManager::new(seed);
            let mut h = Harness::new();
            for dt in dts {
                manager.update(&state, &mut h.ctx(Duration::from_millis(dt)));
                prop_assert!(manager.repository().len(&state) <= MAX_ENEMY_COUNT);
            }
        }
    }
}
