//! Guarded action executor shared by all strategies.
//!
//! The crane owns the yard, the clock and the action sink. Every mutating
//! action goes through it and follows the same contract:
//!
//! 1. Nothing happens unless `time < next_time`.
//! 2. Nothing happens unless the yard accepts the operation.
//! 3. An applied action is logged at the current time, then costs one tick.
//!
//! Strategies therefore never log an action the replay validator would
//! refuse.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::trace;

use super::{Clock, StrategyError};
use crate::log::{Action, ActionSink};
use crate::models::{Tick, Unit};
use crate::yard::Yard;

/// Outcome of a disposal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    /// Removed without payment.
    Expired,
    /// Removed and paid.
    Delivered,
    /// Left in place.
    Kept,
}

impl Disposal {
    /// Whether the unit left the yard.
    #[inline]
    pub fn is_removed(&self) -> bool {
        !matches!(self, Disposal::Kept)
    }
}

/// Counters of a strategy run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Units offered to the strategy.
    pub arrivals: usize,
    /// Units placed in the yard.
    pub placed: usize,
    /// Units refused by admission control.
    pub rejected: usize,
    /// Admitted units for which no column (or no budget) was found.
    pub unplaced: usize,
    /// Units delivered for payment.
    pub delivered: usize,
    /// Units removed after expiry.
    pub expired: usize,
    /// Applied moves.
    pub moves: usize,
    /// Stages started.
    pub stages: usize,
}

/// Guarded executor over a [`Yard`].
#[derive(Debug)]
pub struct Crane<S> {
    yard: Yard,
    clock: Clock,
    sink: S,
    stats: RunStats,
}

impl<S: ActionSink> Crane<S> {
    /// Creates a crane over an empty yard and logs the `START` header.
    pub fn new(width: usize, strategy: &str, mut sink: S) -> Result<Self, StrategyError> {
        let yard = Yard::new(width)?;
        sink.record(Action::Start {
            strategy: strategy.to_string(),
            width,
        })?;
        Ok(Self {
            yard,
            clock: Clock::new(),
            sink,
            stats: RunStats::default(),
        })
    }

    /// The yard.
    #[inline]
    pub fn yard(&self) -> &Yard {
        &self.yard
    }

    /// The clock.
    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Current time.
    #[inline]
    pub fn time(&self) -> Tick {
        self.clock.time()
    }

    /// Whether another action fits in the current budget.
    #[inline]
    pub fn has_budget(&self) -> bool {
        self.clock.has_budget()
    }

    /// Run counters.
    #[inline]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut RunStats {
        &mut self.stats
    }

    /// The action sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the crane and returns the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Opens the budget of a newly arrived unit.
    pub fn begin_event(&mut self, unit: &Unit) {
        self.clock.open_window(unit.arrival.end);
        self.stats.arrivals += 1;
    }

    /// Places a unit that is not yet in the yard.
    pub fn place(&mut self, unit: &Unit, p: usize) -> Result<bool, StrategyError> {
        if !self.clock.has_budget() || !self.yard.add(unit, p) {
            return Ok(false);
        }
        let time = self.clock.time();
        self.sink.record(Action::Add {
            time,
            id: unit.id,
            position: p,
        })?;
        trace!(time, unit = unit.id, position = p, "add");
        self.stats.placed += 1;
        self.clock.tick();
        Ok(true)
    }

    /// Moves a unit already in the yard.
    pub fn relocate(&mut self, unit: &Unit, p: usize) -> Result<bool, StrategyError> {
        if !self.clock.has_budget() || !self.yard.move_unit(unit, p)? {
            return Ok(false);
        }
        let time = self.clock.time();
        self.sink.record(Action::Move {
            time,
            id: unit.id,
            position: p,
        })?;
        trace!(time, unit = unit.id, position = p, "move");
        self.stats.moves += 1;
        self.clock.tick();
        Ok(true)
    }

    /// Removes a unit if it is expired (no payment) or deliverable (paid).
    ///
    /// The unit must be removable; otherwise, or without budget, it is kept.
    pub fn dispose(&mut self, unit: &Unit) -> Result<Disposal, StrategyError> {
        if !self.clock.has_budget() {
            return Ok(Disposal::Kept);
        }
        let Some(stored) = self.yard.get(unit.id).copied() else {
            return Ok(Disposal::Kept);
        };
        let time = self.clock.time();
        let outcome = if stored.is_expired(time) {
            Disposal::Expired
        } else if stored.is_deliverable(time) {
            Disposal::Delivered
        } else {
            return Ok(Disposal::Kept);
        };
        if !self.yard.remove(&stored) {
            return Ok(Disposal::Kept);
        }

        if outcome == Disposal::Delivered {
            self.yard.add_cash(stored.value);
            self.stats.delivered += 1;
        } else {
            self.stats.expired += 1;
        }
        self.sink.record(Action::Remove {
            time,
            id: stored.id,
        })?;
        self.sink.record(Action::Cash {
            time,
            amount: self.yard.cash(),
        })?;
        trace!(time, unit = stored.id, ?outcome, cash = self.yard.cash(), "remove");
        self.clock.tick();
        Ok(outcome)
    }

    /// Disposes of the top unit of column `p`, if any.
    pub fn dispose_top(&mut self, p: usize) -> Result<Disposal, StrategyError> {
        match self.yard.top(p)?.copied() {
            Some(top) => self.dispose(&top),
            None => Ok(Disposal::Kept),
        }
    }

    /// One pass over the tops of `range`, left to right, disposing what can
    /// be disposed. Returns the number of units removed.
    pub fn sweep(&mut self, range: Range<usize>) -> Result<usize, StrategyError> {
        let mut removed = 0;
        for p in range {
            if !self.clock.has_budget() {
                break;
            }
            if self.dispose_top(p)?.is_removed() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Spends the rest of the budget watching the tops of `range`.
    ///
    /// Instead of stepping tick by tick, the clock jumps to the next tick at
    /// which a removable top of `range` becomes deliverable or expires, sweeps
    /// there, and finally jumps to `next_time`.
    pub fn idle(&mut self, range: Range<usize>) -> Result<(), StrategyError> {
        while self.clock.has_budget() {
            let before = self.clock.time();
            self.sweep(range.clone())?;
            if !self.clock.has_budget() {
                break;
            }
            let now = self.clock.time();
            let target = match self.next_disposal_time(range.clone())? {
                Some(t) if t > now => t,
                // Something became disposable during the sweep itself
                Some(_) if now > before => continue,
                Some(_) => now + 1,
                None => self.clock.next_time(),
            };
            self.clock.advance_to(target);
        }
        Ok(())
    }

    /// Jumps to the end of the budget without acting.
    pub fn fast_forward(&mut self) {
        self.clock.fast_forward();
    }

    /// Earliest tick at which a removable top of `range` can be disposed.
    fn next_disposal_time(&self, range: Range<usize>) -> Result<Option<Tick>, StrategyError> {
        let now = self.clock.time();
        let mut next: Option<Tick> = None;
        for p in range {
            let Some(top) = self.yard.top(p)? else {
                continue;
            };
            if !self.yard.can_remove(top) {
                continue;
            }
            let at = if top.is_expired(now) || top.is_deliverable(now) {
                now
            } else {
                top.delivery.start
            };
            next = Some(next.map_or(at, |n| n.min(at)));
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeRange, UnitId};

    fn unit(id: UnitId, size: usize, value: u64, delivery: TimeRange) -> Unit {
        Unit::new(id, size, value, TimeRange::new(0, 100), delivery)
    }

    fn crane(width: usize) -> Crane<Vec<Action>> {
        Crane::new(width, "test", Vec::new()).unwrap()
    }

    #[test]
    fn test_header_logged() {
        let c = crane(5);
        assert_eq!(
            c.sink()[0],
            Action::Start {
                strategy: "test".into(),
                width: 5
            }
        );
    }

    #[test]
    fn test_no_action_without_budget() {
        let mut c = crane(5);
        let u = unit(1, 1, 5, TimeRange::new(0, 10));
        assert!(!c.place(&u, 0).unwrap());
        assert!(c.yard().is_empty());
        assert_eq!(c.sink().len(), 1);
    }

    #[test]
    fn test_place_costs_one_tick() {
        let mut c = crane(5);
        let u = unit(1, 2, 5, TimeRange::new(10, 20));
        c.begin_event(&Unit::new(0, 1, 0, TimeRange::new(0, 3), TimeRange::new(0, 1)));
        assert!(c.place(&u, 0).unwrap());
        assert_eq!(c.time(), 1);
        assert!(!c.place(&unit(2, 2, 5, TimeRange::new(10, 20)), 1).unwrap()); // uneven
        assert_eq!(c.time(), 1);
        assert_eq!(
            c.sink()[1],
            Action::Add {
                time: 0,
                id: 1,
                position: 0
            }
        );
    }

    #[test]
    fn test_deliver_and_expire() {
        let mut c = crane(5);
        let pays = unit(1, 2, 10, TimeRange::new(1, 3));
        let stale = unit(2, 1, 7, TimeRange::new(0, 1));
        c.begin_event(&Unit::new(0, 1, 0, TimeRange::new(0, 10), TimeRange::new(0, 1)));
        assert!(c.place(&pays, 0).unwrap()); // t=0
        assert!(c.place(&stale, 3).unwrap()); // t=1, stale expired now

        assert_eq!(c.dispose(&stale).unwrap(), Disposal::Expired); // t=1
        assert_eq!(c.yard().cash(), 0);
        assert_eq!(c.dispose(&pays).unwrap(), Disposal::Delivered); // t=2
        assert_eq!(c.yard().cash(), 10);
        assert_eq!(c.time(), 3);
        assert_eq!(c.stats().delivered, 1);
        assert_eq!(c.stats().expired, 1);

        let tail: Vec<String> = c.sink()[3..].iter().map(|a| a.to_string()).collect();
        assert_eq!(tail, vec!["1 REMOVE 2", "1 CASH 0", "2 REMOVE 1", "2 CASH 10"]);
    }

    #[test]
    fn test_dispose_keeps_buried_unit() {
        let mut c = crane(3);
        let below = unit(1, 1, 10, TimeRange::new(0, 10));
        let above = unit(2, 1, 10, TimeRange::new(50, 60));
        c.begin_event(&Unit::new(0, 1, 0, TimeRange::new(0, 10), TimeRange::new(0, 1)));
        assert!(c.place(&below, 0).unwrap());
        assert!(c.place(&above, 0).unwrap());
        assert_eq!(c.dispose(&below).unwrap(), Disposal::Kept);
        assert_eq!(c.dispose(&above).unwrap(), Disposal::Kept); // not yet deliverable
        assert_eq!(c.time(), 2);
    }

    #[test]
    fn test_idle_jumps_to_delivery() {
        let mut c = crane(4);
        let u = unit(1, 1, 9, TimeRange::new(40, 60));
        c.begin_event(&Unit::new(0, 1, 0, TimeRange::new(0, 100), TimeRange::new(0, 1)));
        assert!(c.place(&u, 0).unwrap());
        c.idle(0..4).unwrap();

        assert_eq!(c.time(), 100);
        assert_eq!(c.yard().cash(), 9);
        assert!(c
            .sink()
            .iter()
            .any(|a| *a == Action::Remove { time: 40, id: 1 }));
    }

    #[test]
    fn test_idle_reaches_buried_unit() {
        let mut c = crane(2);
        let below = unit(1, 1, 3, TimeRange::new(5, 50));
        let above = unit(2, 1, 4, TimeRange::new(10, 50));
        c.begin_event(&Unit::new(0, 1, 0, TimeRange::new(0, 30), TimeRange::new(0, 1)));
        assert!(c.place(&below, 0).unwrap());
        assert!(c.place(&above, 0).unwrap());
        c.idle(0..2).unwrap();
        // `above` delivered at 10, then `below` (already deliverable) at 11
        assert_eq!(c.yard().cash(), 7);
        assert!(c.yard().is_empty());
        assert_eq!(c.time(), 30);
    }
}
