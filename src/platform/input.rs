//! Held-key tracking
//!
//! Terminals differ: some report press, repeat and release events, others
//! only repeated presses while a key is down. Each key remembers the frame it
//! was last seen; a key without a release event expires once it has been
//! silent for longer than [`HOLD_WINDOW`] frames.

use std::collections::HashMap;

use crate::sim::TickInput;

/// Frames a key stays held after its last press or repeat
pub const HOLD_WINDOW: u64 = 4;

/// Keys that drive the per-tick intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    last_seen: HashMap<Key, u64>,
    frame: u64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start a new front-end frame
    pub fn next_frame(&mut self) {
        self.frame += 1;
    }

    /// Record a press or repeat
    pub fn press(&mut self, key: Key) {
        self.last_seen.insert(key, self.frame);
    }

    pub fn release(&mut self, key: Key) {
        self.last_seen.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.last_seen.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.last_seen
            .get(&key)
            .map(|&last| self.frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    /// Movement axis and fire flag from the keys held right now
    pub fn intent(&self) -> TickInput {
        let axis = |neg: Key, pos: Key| match (self.is_held(neg), self.is_held(pos)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        TickInput {
            move_x: axis(Key::Left, Key::Right),
            move_y: axis(Key::Up, Key::Down),
            fire: self.is_held(Key::Fire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_expire_without_release() {
        let mut input = InputState::new();
        input.press(Key::Left);
        input.press(Key::Fire);
        assert_eq!(
            input.intent(),
            TickInput {
                move_x: -1.0,
                move_y: 0.0,
                fire: true
            }
        );

        for _ in 0..HOLD_WINDOW {
            input.next_frame();
        }
        assert!(input.is_held(Key::Left));
        input.next_frame();
        assert!(!input.is_held(Key::Left));
        assert_eq!(input.intent(), TickInput::default());
    }

    #[test]
    fn test_release_and_opposing_keys() {
        let mut input = InputState::new();
        input.press(Key::Up);
        input.press(Key::Down);
        input.press(Key::Right);
        assert_eq!(input.intent().move_y, 0.0);
        assert_eq!(input.intent().move_x, 1.0);
        input.release(Key::Right);
        assert_eq!(input.intent().move_x, 0.0);
    }
}
