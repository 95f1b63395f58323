//! Simulation clock passed to every crane action.

use crate::models::Tick;

/// Current time and the action budget of the current arrival.
///
/// `next_time` is the end of the current unit's arrival window: actions are
/// legal only while `time < next_time`. Time never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    time: Tick,
    next_time: Tick,
}

impl Clock {
    /// A clock at time 0 with no budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock at `time` with no budget.
    pub fn at(time: Tick) -> Self {
        Self {
            time,
            next_time: time,
        }
    }

    /// Current time.
    #[inline]
    pub fn time(&self) -> Tick {
        self.time
    }

    /// Budget boundary of the current event.
    #[inline]
    pub fn next_time(&self) -> Tick {
        self.next_time
    }

    /// Starts a new event whose actions must finish before `next_time`.
    pub fn open_window(&mut self, next_time: Tick) {
        self.next_time = next_time;
    }

    /// Whether one more action fits in the budget.
    #[inline]
    pub fn has_budget(&self) -> bool {
        self.time < self.next_time
    }

    /// Ticks left in the budget.
    #[inline]
    pub fn remaining(&self) -> Tick {
        self.next_time.saturating_sub(self.time)
    }

    /// Consumes one tick.
    #[inline]
    pub fn tick(&mut self) {
        self.time += 1;
    }

    /// Jumps forward to `target`, capped at `next_time`. Never rewinds.
    pub fn advance_to(&mut self, target: Tick) {
        let target = target.min(self.next_time);
        if target > self.time {
            self.time = target;
        }
    }

    /// Jumps to the end of the budget.
    pub fn fast_forward(&mut self) {
        self.advance_to(self.next_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget() {
        let mut clock = Clock::new();
        assert!(!clock.has_budget());
        clock.open_window(2);
        assert!(clock.has_budget());
        assert_eq!(clock.remaining(), 2);
        clock.tick();
        clock.tick();
        assert!(!clock.has_budget());
        assert_eq!(clock.time(), 2);
    }

    #[test]
    fn test_advance_is_capped_and_monotonic() {
        let mut clock = Clock::at(10);
        clock.open_window(20);
        clock.advance_to(50);
        assert_eq!(clock.time(), 20);
        clock.advance_to(5);
        assert_eq!(clock.time(), 20);
    }

    #[test]
    fn test_window_in_the_past() {
        let mut clock = Clock::at(10);
        clock.open_window(4);
        assert!(!clock.has_budget());
        assert_eq!(clock.remaining(), 0);
        clock.fast_forward();
        assert_eq!(clock.time(), 10);
    }
}
