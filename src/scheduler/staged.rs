//! Time-staged strategy with admission control.
//!
//! # Algorithm
//!
//! Time is cut into stages of length `T`. Units deliverable before the stage
//! deadline live in the working area (A ∪ B); the rest wait in the waiting
//! area W. For each arrival:
//!
//! 1. Open the budget `next_time = arrival.end`.
//! 2. Reject units with `value / size < 1` that cannot be delivered in the
//!    current stage.
//! 3. Begin a new stage if the deadline is at or before
//!    `min(next_time, time + max_height(W) * |W|)`.
//! 4. Place the unit in A (deliverable in stage) or W, on the column where it
//!    lands lowest, falling back to `s1..s4`.
//! 5. Run the pending one-shot housekeeping of the stage (see [`StagePhase`]).
//! 6. Shuttle units A→B and B→A, disposing of tops after every move, while
//!    budget remains. Units that now lie beyond the deadline go to W.
//! 7. Idle until `next_time`, delivering tops as they become due.
//!
//! # Reference
//! Dekker, Voogd & van Asperen (2006), "Advanced methods for container
//! stacking", OR Spectrum 28(4)

use std::ops::Range;
use tracing::debug;

use super::{Crane, RunStats, StagePhase, Strategy, StrategyError};
use crate::config::{AreaLayout, StagedConfig};
use crate::log::{ActionSink, NullSink};
use crate::models::{Tick, Unit};
use crate::search::{first_movable, lowest_column};
use crate::yard::Yard;

/// Time-staged strategy.
#[derive(Debug)]
pub struct StagedStrategy<S = NullSink> {
    crane: Crane<S>,
    layout: AreaLayout,
    stage_length: Tick,
    end: Tick,
    phase: StagePhase,
}

impl<S: ActionSink> StagedStrategy<S> {
    /// Name written in the log header.
    pub const NAME: &'static str = "expert";

    /// Validates `config`, creates an empty yard and logs the header.
    pub fn new(config: &StagedConfig, sink: S) -> Result<Self, StrategyError> {
        config.validate()?;
        let crane = Crane::new(config.width, Self::NAME, sink)?;
        Ok(Self {
            crane,
            layout: config.layout,
            stage_length: config.stage_length,
            end: 0,
            phase: StagePhase::default(),
        })
    }

    /// Deadline of the current stage (0 before the first stage).
    pub fn stage_end(&self) -> Tick {
        self.end
    }

    /// Housekeeping phase of the current stage.
    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Area boundaries.
    pub fn layout(&self) -> &AreaLayout {
        &self.layout
    }

    /// The underlying crane.
    pub fn crane(&self) -> &Crane<S> {
        &self.crane
    }

    /// Consumes the strategy and returns the action sink.
    pub fn into_sink(self) -> S {
        self.crane.into_sink()
    }

    /// Admission control: low-density units are taken only if they can be
    /// delivered within the current stage.
    pub fn admits(&self, unit: &Unit) -> bool {
        !(unit.value_density() < 1 && self.beyond_stage(unit))
    }

    #[inline]
    fn beyond_stage(&self, unit: &Unit) -> bool {
        unit.delivery.start > self.end
    }

    /// Whether the current deadline falls within the horizon of this event.
    fn stage_due(&self) -> Result<bool, StrategyError> {
        let waiting = self.layout.waiting();
        let clearance = self.crane.yard().max_height(waiting.clone())? as Tick
            * waiting.len() as Tick;
        let clock = self.crane.clock();
        let horizon = clock.next_time().min(clock.time().saturating_add(clearance));
        Ok(self.end <= horizon)
    }

    fn begin_stage(&mut self) {
        self.end = self.crane.time().saturating_add(self.stage_length);
        self.phase = self.phase.begin_stage();
        self.crane.stats_mut().stages += 1;
        debug!(
            time = self.crane.time(),
            end = self.end,
            stage = self.crane.stats().stages,
            "new stage"
        );
    }

    /// Places `unit` where it lands lowest in `range`, clearing a stale top
    /// on the chosen column first.
    fn place_lowest(&mut self, unit: &Unit, range: Range<usize>) -> Result<bool, StrategyError> {
        if !self.crane.has_budget() {
            return Ok(false);
        }
        let Some(p) = lowest_column(self.crane.yard(), unit, range.clone()) else {
            return Ok(false);
        };
        if self.crane.dispose_top(p)?.is_removed() {
            // The removal may have changed which column is lowest
            let Some(p) = lowest_column(self.crane.yard(), unit, range) else {
                return Ok(false);
            };
            return self.crane.place(unit, p);
        }
        self.crane.place(unit, p)
    }

    /// Moves a stored unit to `dest`, unless it can be disposed of right away.
    fn shift(&mut self, unit: &Unit, dest: usize) -> Result<(), StrategyError> {
        if self.crane.dispose(unit)?.is_removed() {
            return Ok(());
        }
        self.crane.dispose_top(dest)?;
        self.crane.relocate(unit, dest)?;
        Ok(())
    }

    /// Sends units that no longer fit the stage to the waiting area.
    fn redirect(&self, unit: &Unit, dest: usize) -> usize {
        if !self.beyond_stage(unit) {
            return dest;
        }
        lowest_column(self.crane.yard(), unit, self.layout.waiting()).unwrap_or(dest)
    }

    fn sweep_working(&mut self) -> Result<(), StrategyError> {
        self.crane.sweep(self.layout.working())?;
        Ok(())
    }

    fn housekeep(&mut self) -> Result<(), StrategyError> {
        if self.phase == StagePhase::AwaitingEmpty {
            self.sweep_working()?;
            if self.crane.has_budget() {
                self.phase = self.phase.advance();
            }
        }
        if self.phase == StagePhase::AwaitingRedistribute && self.redistribute()? {
            self.phase = self.phase.advance();
            debug!(time = self.crane.time(), "stage settled");
        }
        Ok(())
    }

    /// Empties the waiting area into the working area, then pushes units of
    /// B that do not fit the stage back out. Returns whether it completed
    /// within the budget.
    fn redistribute(&mut self) -> Result<bool, StrategyError> {
        let (area_a, area_b) = (self.layout.area_a(), self.layout.area_b());
        let waiting = self.layout.waiting();

        while self.crane.has_budget() {
            let Some((unit, dest)) =
                first_movable(self.crane.yard(), waiting.clone(), area_a.clone(), |_| true)
            else {
                break;
            };
            let dest = if self.beyond_stage(&unit) {
                lowest_column(self.crane.yard(), &unit, area_b.clone()).unwrap_or(dest)
            } else {
                dest
            };
            let before = self.crane.time();
            self.shift(&unit, dest)?;
            self.crane.sweep(waiting.clone())?;
            self.sweep_working()?;
            if self.crane.time() == before {
                break;
            }
        }

        while self.crane.has_budget() {
            self.crane.sweep(waiting.clone())?;
            self.sweep_working()?;
            let end = self.end;
            let Some((unit, dest)) = first_movable(
                self.crane.yard(),
                area_b.clone(),
                waiting.clone(),
                |u| u.delivery.start > end,
            ) else {
                break;
            };
            let before = self.crane.time();
            self.shift(&unit, dest)?;
            if self.crane.time() == before {
                break;
            }
        }

        if !self.crane.has_budget() {
            return Ok(false);
        }
        self.crane.sweep(waiting)?;
        self.sweep_working()?;
        Ok(true)
    }

    /// Moves every movable top of `from` to `to`, one at a time.
    fn drain(&mut self, from: Range<usize>, to: Range<usize>) -> Result<(), StrategyError> {
        while self.crane.has_budget() {
            let Some((unit, dest)) =
                first_movable(self.crane.yard(), from.clone(), to.clone(), |_| true)
            else {
                break;
            };
            let dest = self.redirect(&unit, dest);
            let before = self.crane.time();
            self.shift(&unit, dest)?;
            self.sweep_working()?;
            if self.crane.time() == before {
                break;
            }
        }
        self.sweep_working()
    }

    fn rebalance(&mut self) -> Result<(), StrategyError> {
        let (area_a, area_b) = (self.layout.area_a(), self.layout.area_b());
        while self.crane.has_budget() {
            let before = self.crane.time();
            self.drain(area_a.clone(), area_b.clone())?;
            self.drain(area_b.clone(), area_a.clone())?;
            if self.crane.time() == before {
                break;
            }
        }
        Ok(())
    }
}

impl<S: ActionSink> Strategy for StagedStrategy<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_arrival(&mut self, unit: Unit) -> Result<(), StrategyError> {
        self.crane.begin_event(&unit);

        if self.admits(&unit) {
            if self.stage_due()? {
                self.begin_stage();
            }
            let target = if unit.delivery.start < self.end {
                self.layout.area_a()
            } else {
                self.layout.waiting()
            };
            if !self.place_lowest(&unit, target)? && !self.place_lowest(&unit, self.layout.all())? {
                self.crane.stats_mut().unplaced += 1;
                debug!(time = self.crane.time(), unit = unit.id, "no column for unit");
            }
        } else {
            self.crane.stats_mut().rejected += 1;
            debug!(
                time = self.crane.time(),
                unit = unit.id,
                end = self.end,
                "unit rejected"
            );
        }

        self.housekeep()?;
        self.sweep_working()?;
        self.rebalance()?;
        self.crane.idle(self.layout.working())
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
