//! Simulation time model.
//!
//! # Time Model
//! Time is a discrete, non-negative tick counter starting at 0. One crane
//! action (placement, move, removal) costs exactly one tick. Negative times
//! cannot be represented.

use serde::{Deserialize, Serialize};

/// A simulation tick.
pub type Tick = u64;

/// A tick interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TimeRange {
    /// Interval start (inclusive).
    pub start: Tick,
    /// Interval end (exclusive).
    pub end: Tick,
}

impl TimeRange {
    /// Creates a new range.
    pub fn new(start: Tick, end: Tick) -> Self {
        Self { start, end }
    }

    /// Number of ticks covered.
    #[inline]
    pub fn duration(&self) -> Tick {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no tick at all (`end <= start`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether a tick falls within this range.
    #[inline]
    pub fn contains(&self, time: Tick) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two ranges overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains() {
        let r = TimeRange::new(10, 20);
        assert!(!r.contains(9));
        assert!(r.contains(10));
        assert!(r.contains(19));
        assert!(!r.contains(20)); // exclusive end
        assert_eq!(r.duration(), 10);
    }

    #[test]
    fn test_range_empty() {
        assert!(TimeRange::new(5, 5).is_empty());
        assert!(TimeRange::new(6, 5).is_empty());
        assert_eq!(TimeRange::new(6, 5).duration(), 0);
        assert!(!TimeRange::new(5, 6).is_empty());
    }

    #[test]
    fn test_range_overlap() {
        let a = TimeRange::new(0, 10);
        assert!(a.overlaps(&TimeRange::new(5, 15)));
        assert!(!a.overlaps(&TimeRange::new(10, 20))); // adjacent, not overlapping
    }
}
