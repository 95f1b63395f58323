//! Yard strategies and run metrics.
//!
//! A strategy receives units one at a time in arrival order and reacts to each
//! within its arrival window. All yard mutations go through a [`Crane`],
//! which enforces the time budget and logs every applied action.
//!
//! # Strategies
//!
//! | Strategy | Log name | Idea |
//! |----------|----------|------|
//! | [`StagedStrategy`] | `expert` | Time stages, admission control, A/B/W areas |
//! | [`SimpleStrategy`] | `simple_strategy` | One pair of stacks per unit size |
//!
//! # Example
//!
//! ```
//! use u_yard::config::StagedConfig;
//! use u_yard::log::NullSink;
//! use u_yard::models::{TimeRange, Unit};
//! use u_yard::scheduler::{run, StagedStrategy};
//!
//! let units = vec![
//!     Unit::new(1, 2, 40, TimeRange::new(0, 10), TimeRange::new(5, 50)),
//!     Unit::new(2, 1, 10, TimeRange::new(10, 200), TimeRange::new(60, 100)),
//! ];
//! let mut strategy = StagedStrategy::new(&StagedConfig::new(35), NullSink).unwrap();
//! let summary = run(&mut strategy, &units).unwrap();
//! assert_eq!(summary.cash, 50);
//! ```

mod clock;
mod crane;
mod kpi;
mod simple;
mod stage;
mod staged;

pub use clock::Clock;
pub use crane::{Crane, Disposal, RunStats};
pub use kpi::{potential_cash, RunSummary};
pub use simple::SimpleStrategy;
pub use stage::StagePhase;
pub use staged::StagedStrategy;

use thiserror::Error;
use tracing::info;

use crate::config::ConfigError;
use crate::log::LogError;
use crate::models::{Tick, Unit};
use crate::yard::{Yard, YardError};

/// Failure that aborts a strategy run.
///
/// Infeasible stacking operations are not errors; they are simply not
/// applied.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The strategy configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A column index outside the yard reached the yard.
    #[error(transparent)]
    Yard(#[from] YardError),

    /// The action log could not be written.
    #[error(transparent)]
    Log(#[from] LogError),
}

/// An online yard policy.
pub trait Strategy {
    /// Name written in the `START` header.
    fn name(&self) -> &'static str;

    /// Reacts to one arrival. Units must be offered in arrival order.
    fn on_arrival(&mut self, unit: Unit) -> Result<(), StrategyError>;

    /// Current yard state.
    fn yard(&self) -> &Yard;

    /// Current simulation time.
    fn time(&self) -> Tick;

    /// Counters collected so far.
    fn stats(&self) -> &RunStats;
}

/// Offers every unit to `strategy` in order and summarizes the run.
pub fn run<S: Strategy + ?Sized>(
    strategy: &mut S,
    units: &[Unit],
) -> Result<RunSummary, StrategyError> {
    for unit in units {
        strategy.on_arrival(*unit)?;
    }
    let summary = RunSummary::calculate(strategy, units);
    info!(
        strategy = summary.strategy.as_str(),
        units = summary.units,
        cash = summary.cash,
        potential = summary.potential_cash,
        final_time = summary.final_time,
        "run finished"
    );
    Ok(summary)
}
