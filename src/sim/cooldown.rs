//! Accumulated-time cooldown gate

use std::time::Duration;

/// Minimum elapsed time between two events, tracked by accumulating tick
/// deltas rather than comparing against a wall-clock deadline.
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration: Duration,
    elapsed: Duration,
    active: bool,
}

impl Cooldown {
    /// A disarmed cooldown (the first event is allowed immediately)
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            active: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time accumulated since the cooldown was armed
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_ready(&self) -> bool {
        !self.active
    }

    /// Start a new cooldown period
    pub fn arm(&mut self) {
        self.active = true;
        self.elapsed = Duration::ZERO;
    }

    /// Accumulate `dt`; the cooldown clears once the full duration has elapsed
    pub fn advance(&mut self, dt: Duration) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.active = false;
            self.elapsed = Duration::ZERO;
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.elapsed = Duration::ZERO;
    }
}
