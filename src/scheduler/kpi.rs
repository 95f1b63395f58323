//! Run quality metrics (KPIs).
//!
//! Computes performance indicators from a finished strategy and its input
//! stream.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Cash | Sum of values of delivered units |
//! | Potential cash | Sum of values of units with `delivery.start` before the last arrival end |
//! | Capture rate | cash / potential cash |
//! | Remaining | Units still in the yard |

use serde::{Deserialize, Serialize};

use super::Strategy;
use crate::models::{Tick, Unit};

/// Strategy performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Strategy name.
    pub strategy: String,
    /// Units in the input stream.
    pub units: usize,
    /// Units placed in the yard.
    pub placed: usize,
    /// Units refused by admission control.
    pub rejected: usize,
    /// Admitted units that found no column or no budget.
    pub unplaced: usize,
    /// Units delivered for payment.
    pub delivered: usize,
    /// Units removed after expiry.
    pub expired: usize,
    /// Units still in the yard.
    pub remaining: usize,
    /// Applied moves.
    pub moves: usize,
    /// Stages started.
    pub stages: usize,
    /// Time after the last event.
    pub final_time: Tick,
    /// Cash earned.
    pub cash: u64,
    /// Cash that could have been earned before the stream ended.
    pub potential_cash: u64,
    /// `cash / potential_cash` (1.0 when nothing could be earned).
    pub capture_rate: f64,
}

impl RunSummary {
    /// Computes KPIs from a strategy after it consumed `units`.
    pub fn calculate<S: Strategy + ?Sized>(strategy: &S, units: &[Unit]) -> Self {
        let stats = strategy.stats();
        let cash = strategy.yard().cash();
        let potential_cash = potential_cash(units);

        let capture_rate = if potential_cash == 0 {
            1.0
        } else {
            cash as f64 / potential_cash as f64
        };

        Self {
            strategy: strategy.name().to_string(),
            units: units.len(),
            placed: stats.placed,
            rejected: stats.rejected,
            unplaced: stats.unplaced,
            delivered: stats.delivered,
            expired: stats.expired,
            remaining: strategy.yard().len(),
            moves: stats.moves,
            stages: stats.stages,
            final_time: strategy.time(),
            cash,
            potential_cash,
            capture_rate,
        }
    }

    /// Whether the run captured at least `min_capture_rate` of the potential.
    pub fn meets_threshold(&self, min_capture_rate: f64) -> bool {
        self.capture_rate >= min_capture_rate
    }
}

/// Sum of values of units deliverable before the last arrival window closes.
pub fn potential_cash(units: &[Unit]) -> u64 {
    let Some(horizon) = units.iter().map(|u| u.arrival.end).max() else {
        return 0;
    };
    units
        .iter()
        .filter(|u| u.delivery.start < horizon)
        .map(|u| u.value)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StagedConfig;
    use crate::log::NullSink;
    use crate::models::TimeRange;
    use crate::scheduler::{run, StagedStrategy};

    fn unit(id: u64, value: u64, arrival_end: Tick, delivery_start: Tick) -> Unit {
        Unit::new(
            id,
            1,
            value,
            TimeRange::new(0, arrival_end),
            TimeRange::new(delivery_start, delivery_start + 10),
        )
    }

    #[test]
    fn test_potential_cash() {
        let units = vec![unit(1, 10, 5, 3), unit(2, 20, 50, 40), unit(3, 7, 20, 60)];
        // Horizon 50: units 1 and 2 count
        assert_eq!(potential_cash(&units), 30);
        assert_eq!(potential_cash(&[]), 0);
    }

    #[test]
    fn test_summary_of_run() {
        let units = vec![unit(1, 10, 100, 20), unit(2, 5, 150, 500)];
        let mut s = StagedStrategy::new(&StagedConfig::new(35), NullSink).unwrap();
        let summary = run(&mut s, &units).unwrap();

        assert_eq!(summary.strategy, "expert");
        assert_eq!(summary.units, 2);
        assert_eq!(summary.cash, 10);
        assert_eq!(summary.potential_cash, 10);
        assert!((summary.capture_rate - 1.0).abs() < 1e-10);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.remaining, 1);
        assert_eq!(summary.final_time, 150);
        assert!(summary.meets_threshold(0.9));
    }

    #[test]
    fn test_empty_run() {
        let s = StagedStrategy::new(&StagedConfig::new(35), NullSink).unwrap();
        let summary = RunSummary::calculate(&s, &[]);
        assert_eq!(summary.units, 0);
        assert_eq!(summary.cash, 0);
        assert!((summary.capture_rate - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_serde_roundtrip() {
        let s = StagedStrategy::new(&StagedConfig::new(35), NullSink).unwrap();
        let summary = RunSummary::calculate(&s, &[unit(1, 3, 5, 100)]);
        let json = serde_json::to_string(&summary).unwrap();
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
