//! Offline replay validator.
//!
//! Rebuilds a yard from the `START` header and applies every logged action
//! to it, using the unit records the run was fed with. A log is accepted only
//! if every action was legal when applied and every `CASH` line matches the
//! recomputed cash.
//!
//! A `REMOVE` pays the unit's value iff the unit is deliverable at the line's
//! timestamp.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use thiserror::Error;

use crate::log::{Action, ActionParseError, LogError};
use crate::models::{Tick, Unit, UnitId};
use crate::yard::{Yard, YardError};

/// Integrity failure of a replayed log. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The log could not be read.
    #[error(transparent)]
    Log(#[from] LogError),

    /// A line is not a valid action.
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: ActionParseError,
    },

    /// The first action is not `START`.
    #[error("log does not start with a START header")]
    MissingHeader,

    /// A second `START`.
    #[error("line {line}: duplicate START header")]
    DuplicateHeader { line: usize },

    /// The header width cannot build a yard.
    #[error("invalid header: {0}")]
    Header(#[from] YardError),

    /// The header width exceeds what a replay will allocate.
    #[error("header width {width} exceeds the maximum of {max}")]
    WidthTooLarge { width: usize, max: usize },

    /// Timestamps went backwards.
    #[error("line {line}: time {time} is before the previous time {last}")]
    TimeWentBack { line: usize, time: Tick, last: Tick },

    /// The log names a unit that is not in the records.
    #[error("line {line}: unknown unit {id}")]
    UnknownUnit { line: usize, id: UnitId },

    /// The action is not applicable to the yard.
    #[error("line {line}: illegal action '{action}': {reason}")]
    IllegalAction {
        line: usize,
        action: String,
        reason: &'static str,
    },

    /// The logged cash differs from the replayed cash.
    #[error("line {line}: logged cash {logged}, replayed cash {expected}")]
    CashMismatch {
        line: usize,
        logged: u64,
        expected: u64,
    },
}

/// Outcome of an accepted log.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// Strategy name from the header.
    pub strategy: String,
    /// Yard width from the header.
    pub width: usize,
    /// Actions replayed, header excluded.
    pub actions: usize,
    /// Timestamp of the last action.
    pub final_time: Tick,
    /// Yard after the last action.
    pub yard: Yard,
}

impl ReplayReport {
    /// Replayed cash.
    pub fn cash(&self) -> u64 {
        self.yard.cash()
    }
}

/// Widest yard a log header may ask for.
pub const MAX_REPLAY_WIDTH: usize = 1 << 16;

/// Replays a log against its unit records.
pub fn replay<R: BufRead>(units: &[Unit], log: R) -> Result<ReplayReport, ReplayError> {
    replay_with(units, log, |_, _| {})
}

/// Replays a log, showing the yard to `observer` after each action
/// (header included).
pub fn replay_with<R, F>(units: &[Unit], log: R, mut observer: F) -> Result<ReplayReport, ReplayError>
where
    R: BufRead,
    F: FnMut(&Yard, &Action),
{
    let records: HashMap<UnitId, &Unit> = units.iter().map(|u| (u.id, u)).collect();
    let unit = |line: usize, id: UnitId| {
        records
            .get(&id)
            .copied()
            .ok_or(ReplayError::UnknownUnit { line, id })
    };

    let mut header: Option<(String, Yard)> = None;
    let mut departed: HashSet<UnitId> = HashSet::new();
    let mut last: Tick = 0;
    let mut count = 0;

    for (index, text) in log.lines().enumerate() {
        let text = text.map_err(LogError::from)?;
        if text.trim().is_empty() {
            continue;
        }
        let line = index + 1;
        let action: Action = text
            .parse()
            .map_err(|source| ReplayError::Parse { line, source })?;
        if let Action::Start { strategy, width } = &action {
            if header.is_some() {
                return Err(ReplayError::DuplicateHeader { line });
            }
            if *width > MAX_REPLAY_WIDTH {
                return Err(ReplayError::WidthTooLarge {
                    width: *width,
                    max: MAX_REPLAY_WIDTH,
                });
            }
            let yard = Yard::new(*width)?;
            observer(&yard, &action);
            header = Some((strategy.clone(), yard));
            continue;
        }
        let Some((_, yard)) = header.as_mut() else {
            return Err(ReplayError::MissingHeader);
        };

        let time = action.time();
        if time < last {
            return Err(ReplayError::TimeWentBack { line, time, last });
        }
        last = time;

        let illegal = |reason| ReplayError::IllegalAction {
            line,
            action: action.to_string(),
            reason,
        };
        match &action {
            Action::Start { .. } => {}
            Action::Add { id, position, .. } => {
                let u = unit(line, *id)?;
                if departed.contains(id) {
                    return Err(illegal("unit already left the yard"));
                }
                if !yard.add(u, *position) {
                    return Err(illegal("no flat base for the unit at this position"));
                }
            }
            Action::Move { id, position, .. } => {
                let u = unit(line, *id)?;
                match yard.move_unit(u, *position) {
                    Ok(true) => {}
                    Ok(false) => return Err(illegal("unit cannot be moved to this position")),
                    Err(_) => return Err(illegal("position outside the yard")),
                }
            }
            Action::Remove { id, .. } => {
                let u = unit(line, *id)?;
                if !yard.remove(u) {
                    return Err(illegal("unit is not on top of its columns"));
                }
                departed.insert(*id);
                if u.is_deliverable(time) {
                    yard.add_cash(u.value);
                }
            }
            Action::Cash { amount, .. } => {
                if *amount != yard.cash() {
                    return Err(ReplayError::CashMismatch {
                        line,
                        logged: *amount,
                        expected: yard.cash(),
                    });
                }
            }
        }
        count += 1;
        observer(yard, &action);
    }

    let (strategy, yard) = header.ok_or(ReplayError::MissingHeader)?;
    Ok(ReplayReport {
        strategy,
        width: yard.width(),
        actions: count,
        final_time: last,
        yard,
    })
}
