//! Fixed-interval tick source
//!
//! Wall time is fed in by the host's frame loop and converted into a whole
//! number of ticks. Stopping the timer drops any partial tick.

use std::time::Duration;

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Clone)]
pub struct FixedTimer {
    interval: Duration,
    accumulator: Duration,
    active: bool,
}

impl FixedTimer {
    /// A stopped timer; a zero interval is bumped to one microsecond
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_micros(1)),
            accumulator: Duration::ZERO,
            active: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        if !self.active {
            log::debug!("Tick timer started ({:?})", self.interval);
        }
        self.active = true;
    }

    pub fn stop(&mut self) {
        if self.active {
            log::debug!("Tick timer stopped");
        }
        self.active = false;
        self.accumulator = Duration::ZERO;
    }

    /// Accumulate `elapsed` and return how many ticks are due, at most
    /// [`MAX_SUBSTEPS`]. Time beyond that cap is discarded.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.active {
            return 0;
        }
        self.accumulator += elapsed;

        let mut due = 0;
        while self.accumulator >= self.interval && due < MAX_SUBSTEPS {
            self.accumulator -= self.interval;
            due += 1;
        }
        if due == MAX_SUBSTEPS && self.accumulator >= self.interval {
            log::trace!("Dropping {:?} of backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_timer_never_ticks() {
        let mut timer = FixedTimer::new(Duration::from_millis(10));
        assert_eq!(timer.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn test_accumulates_partial_ticks() {
        let mut timer = FixedTimer::new(Duration::from_millis(10));
        timer.start();
        assert_eq!(timer.advance(Duration::from_millis(15)), 1);
        assert_eq!(timer.advance(Duration::from_millis(5)), 1);
        assert_eq!(timer.advance(Duration::from_millis(9)), 0);
    }

    #[test]
    fn test_substeps_capped_and_backlog_dropped() {
        let mut timer = FixedTimer::new(Duration::from_millis(10));
        timer.start();
        assert_eq!(timer.advance(Duration::from_secs(5)), MAX_SUBSTEPS);
        assert_eq!(timer.advance(Duration::from_millis(1)), 0);
    }

    #[test]
    fn test_stop_drops_partial_tick() {
        let mut timer = FixedTimer::new(Duration::from_millis(10));
        timer.start();
        timer.advance(Duration::from_millis(9));
        timer.stop();
        timer.start();
        assert_eq!(timer.advance(Duration::from_millis(1)), 0);
    }
}
