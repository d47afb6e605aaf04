//! Authoritative collections of active entities
//!
//! Entries are keyed by [`EntityId`] so iteration order is stable (by id) and
//! duplicates are impossible. Every access takes the session's
//! [`StateMachine`] and panics when the state does not permit it.

use std::collections::BTreeMap;

use super::bullet::Bullet;
use super::enemy::Enemy;
use super::entity::{Entity, EntityId};
use super::state::StateMachine;

/// Active entities of one kind
#[derive(Debug, Clone)]
pub struct Repository<T> {
    entities: BTreeMap<EntityId, T>,
}

pub type BulletRepository = Repository<Bullet>;
pub type EnemyRepository = Repository<Enemy>;

impl<T> Default for Repository<T> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entity`; returns false when its id is already present
    #[track_caller]
    pub fn add(&mut self, state: &StateMachine, entity: T) -> bool {
        state.ensure_running("add");
        let id = entity.id();
        if self.entities.contains_key(&id) {
            log::warn!("Entity {id} is already registered");
            return false;
        }
        self.entities.insert(id, entity);
        true
    }

    /// Remove by id; returns whether it was present
    #[track_caller]
    pub fn remove(&mut self, state: &StateMachine, id: EntityId) -> bool {
        state.ensure_running("remove");
        self.entities.remove(&id).is_some()
    }

    /// Remove every entity matching `predicate`; returns how many went
    #[track_caller]
    pub fn remove_if<F>(&mut self, state: &StateMachine, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        state.ensure_running("remove_if");
        let before = self.entities.len();
        self.entities.retain(|_, e| !predicate(e));
        before - self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[track_caller]
    pub fn len(&self, state: &StateMachine) -> usize {
        state.ensure_initialized("len");
        self.entities.len()
    }

    #[track_caller]
    pub fn iter(&self, state: &StateMachine) -> impl Iterator<Item = &T> {
        state.ensure_initialized("iter");
        self.entities.values()
    }

    #[track_caller]
    pub fn get(&self, state: &StateMachine, id: EntityId) -> Option<&T> {
        state.ensure_initialized("get");
        self.entities.get(&id)
    }

    #[track_caller]
    pub fn iter_mut(&mut self, state: &StateMachine) -> impl Iterator<Item = &mut T> {
        state.ensure_running("iter_mut");
        self.entities.values_mut()
    }

    #[track_caller]
    pub fn get_mut(&mut self, state: &StateMachine, id: EntityId) -> Option<&mut T> {
        state.ensure_running("get_mut");
        self.entities.get_mut(&id)
    }
}
