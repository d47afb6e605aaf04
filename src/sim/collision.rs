//! Axis-aligned boxes and bullet hit resolution

use glam::Vec2;

use super::bullet::{Team, Bullet};
use super::entity::{Body, Entity, EntityId};
use super::enemy::Enemy;
use super::player::Player;
use super::repository::Repository;
use super::state::StateMachine;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Rect at the origin covering `size`
    pub fn from_size(size: Vec2) -> Self {
        Self::new(Vec2::ZERO, size)
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Overlap test; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }
}

/// Outcome of one round of hit resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitReport {
    /// Enemies whose hit points dropped to zero this tick
    pub enemies_defeated: u32,
    /// Damage taken by the player this tick
    pub player_damage: i32,
    /// Bullets consumed by a hit
    pub bullets_spent: u32,
}

fn can_be_hit(body: &Body, shot: &Rect) -> bool {
    body.collidable && !body.is_defeated() && body.bounding_box().intersects(shot)
}

/// Apply every overlapping bullet to the first live, collidable body of the
/// opposing team. A bullet hits at most once and is removed when it does.
pub fn resolve_hits(
    state: &StateMachine,
    bullets: &mut Repository<Bullet>,
    mut player: Option<&mut Player>,
    enemies: &mut Repository<Enemy>,
) -> HitReport {
    let shots: Vec<(EntityId, Team, Rect, i32)> = bullets
        .iter(state)
        .map(|b| (b.id(), b.team(), b.body().bounding_box(), b.damage()))
        .collect();

    let mut report = HitReport::default();
    let mut spent = Vec::new();

    for (id, team, shot, damage) in shots {
        let hit = match team {
            Team::Player => match enemies.iter_mut(state).find(|e| can_be_hit(e.body(), &shot)) {
                Some(enemy) => {
                    enemy.body_mut().take_damage(damage);
                    if enemy.body().is_defeated() {
                        log::debug!("Enemy {} defeated by bullet {id}", enemy.id());
                        report.enemies_defeated += 1;
                    }
                    true
                }
                None => false,
            },
            Team::Enemy => match player.as_deref_mut() {
                Some(p) if can_be_hit(p.body(), &shot) => {
                    p.body_mut().take_damage(damage);
                    report.player_damage += damage;
                    true
                }
                _ => false,
            },
        };
        if hit {
            spent.push(id);
        }
    }

    for id in spent {
        if bullets.remove(state, id) {
            report.bullets_spent += 1;
        }
    }
    report
}
