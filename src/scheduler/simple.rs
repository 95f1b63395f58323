//! Size-keyed double-column strategy.
//!
//! # Algorithm
//!
//! Every unit size `s` owns two stacks, at `base(s)` and `base(s) + s`:
//!
//! | Size | Stacks |
//! |------|--------|
//! | 1 | 0, 1 |
//! | 2 | 2, 4 |
//! | 3 | 6, 9 |
//! | 4 | 12, 16 |
//!
//! 1. Place the arriving unit on its first stack.
//! 2. While budget remains and the yard is not empty, for each size move the
//!    first stack onto the second top to bottom, then back. Tops that are
//!    expired or deliverable are disposed of instead of moved.
//! 3. Idle until `next_time`.
//!
//! Units of one size only ever share stacks with each other, so every base
//! is flat. Needs at least 20 columns.

use tracing::debug;

use super::{Crane, RunStats, Strategy, StrategyError};
use crate::config::SimpleConfig;
use crate::log::{ActionSink, NullSink};
use crate::models::{Tick, Unit, MAX_UNIT_SIZE, MIN_UNIT_SIZE};
use crate::yard::Yard;

/// First stack of the pair assigned to units of `size`.
pub fn stack_base(size: usize) -> Option<usize> {
    match size {
        1 => Some(0),
        2 => Some(2),
        3 => Some(6),
        4 => Some(12),
        _ => None,
    }
}

/// Size-keyed double-column strategy.
#[derive(Debug)]
pub struct SimpleStrategy<S = NullSink> {
    crane: Crane<S>,
}

impl<S: ActionSink> SimpleStrategy<S> {
    /// Name written in the log header.
    pub const NAME: &'static str = "simple_strategy";

    /// Validates `config`, creates an empty yard and logs the header.
    pub fn new(config: &SimpleConfig, sink: S) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            crane: Crane::new(config.width, Self::NAME, sink)?,
        })
    }

    /// The underlying crane.
    pub fn crane(&self) -> &Crane<S> {
        &self.crane
    }

    /// Consumes the strategy and returns the action sink.
    pub fn into_sink(self) -> S {
        self.crane.into_sink()
    }

    /// Moves the stack at `from` onto `to` while budget remains.
    fn shift_stack(&mut self, from: usize, to: usize) -> Result<(), StrategyError> {
        while self.crane.has_budget() {
            let Some(top) = self.crane.yard().top(from)?.copied() else {
                break;
            };
            if self.crane.dispose(&top)?.is_removed() {
                continue;
            }
            if !self.crane.relocate(&top, to)? {
                break;
            }
        }
        Ok(())
    }
}

impl<S: ActionSink> Strategy for SimpleStrategy<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_arrival(&mut self, unit: Unit) -> Result<(), StrategyError> {
        self.crane.begin_event(&unit);

        let placed = match stack_base(unit.size) {
            Some(p) => self.crane.place(&unit, p)?,
            None => false,
        };
        if !placed {
            self.crane.stats_mut().unplaced += 1;
            debug!(time = self.crane.time(), unit = unit.id, "unit not placed");
        }

        while self.crane.has_budget() && !self.crane.yard().is_empty() {
            let before = self.crane.time();
            for size in MIN_UNIT_SIZE..=MAX_UNIT_SIZE {
                let Some(p) = stack_base(size) else {
                    continue;
                };
                self.shift_stack(p, p + size)?;
                self.shift_stack(p + size, p)?;
            }
            if self.crane.time() == before {
                break;
            }
        }

        self.crane.fast_forward();
        Ok(())
    }

    fn yard(&self) -> &Yard {
        self.crane.yard()
    }

    fn time(&self) -> Tick {
        self.crane.time()
    }

    fn stats(&self) -> &RunStats {
        self.crane.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::log::Action;
    use crate::models::{TimeRange, UnitId};

    fn unit(id: UnitId, size: usize, arrival: (Tick, Tick), delivery: (Tick, Tick)) -> Unit {
        Unit::new(
            id,
            size,
            10,
            TimeRange::new(arrival.0, arrival.1),
            TimeRange::new(delivery.0, delivery.1),
        )
    }

    fn strategy() -> SimpleStrategy<Vec<Action>> {
        SimpleStrategy::new(&SimpleConfig::new(20), Vec::new()).unwrap()
    }

    #[test]
    fn test_stack_bases() {
        assert_eq!(stack_base(1), Some(0));
        assert_eq!(stack_base(4), Some(12));
        assert_eq!(stack_base(0), None);
        assert_eq!(stack_base(5), None);
        // Second stack of the widest pair ends at the minimum width
        assert_eq!(stack_base(4).map(|p| p + 4 + 4), Some(20));
    }

    #[test]
    fn test_width_too_small() {
        let err = SimpleStrategy::new(&SimpleConfig::new(19), NullSink).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::Config(ConfigError::WidthTooSmall { .. })
        ));
    }

    #[test]
    fn test_header_and_first_add() {
        let mut s = strategy();
        s.on_arrival(unit(7, 3, (0, 1), (100, 200))).unwrap();
        let log: Vec<String> = s.crane().sink().iter().map(|a| a.to_string()).collect();
        assert_eq!(log, vec!["0 START simple_strategy 20", "0 ADD 7 6"]);
        assert_eq!(s.time(), 1);
    }

    #[test]
    fn test_shuttles_and_delivers() {
        let mut s = strategy();
        s.on_arrival(unit(1, 2, (0, 50), (20, 30))).unwrap();
        assert_eq!(s.yard().cash(), 10);
        assert!(s.yard().is_empty());
        assert_eq!(s.stats().delivered, 1);
        // Moves between columns 2 and 4 until delivery at t=20
        assert_eq!(s.stats().moves, 19);
        assert_eq!(s.time(), 50);
    }

    #[test]
    fn test_expired_units_leave() {
        let mut s = strategy();
        s.on_arrival(unit(1, 1, (0, 1), (1, 2))).unwrap();
        s.on_arrival(unit(2, 4, (5, 10), (100, 200))).unwrap();
        assert_eq!(s.stats().expired, 1);
        assert_eq!(s.yard().cash(), 0);
        assert_eq!(s.yard().len(), 1);
    }

    #[test]
    fn test_oversized_unit_is_unplaced() {
        let mut s = strategy();
        s.on_arrival(unit(1, 5, (0, 10), (20, 30))).unwrap();
        assert_eq!(s.stats().unplaced, 1);
        assert!(s.yard().is_empty());
        assert_eq!(s.time(), 10);
    }
}
