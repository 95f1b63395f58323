//! One-shot housekeeping state of a stage.

use serde::{Deserialize, Serialize};

/// Housekeeping progress within the current stage.
///
/// Each step runs at most once per stage:
///
/// ```text
///  begin_stage          advance                  advance
/// ───────────▶ AwaitingEmpty ───▶ AwaitingRedistribute ───▶ Settled
/// ```
///
/// A run starts in `Settled` because no stage is active yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StagePhase {
    /// Working-area tops still have to be swept.
    AwaitingEmpty,
    /// The waiting area still has to be redistributed.
    AwaitingRedistribute,
    /// Nothing left to do until the next stage.
    #[default]
    Settled,
}

impl StagePhase {
    /// Phase entered when a new stage begins, whatever the current phase.
    pub fn begin_stage(self) -> Self {
        StagePhase::AwaitingEmpty
    }

    /// Phase after the current step completed.
    pub fn advance(self) -> Self {
        match self {
            StagePhase::AwaitingEmpty => StagePhase::AwaitingRedistribute,
            StagePhase::AwaitingRedistribute | StagePhase::Settled => StagePhase::Settled,
        }
    }

    /// Whether the current stage needs no more housekeeping.
    #[inline]
    pub fn is_settled(&self) -> bool {
        *self == StagePhase::Settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_settled() {
        assert_eq!(StagePhase::default(), StagePhase::Settled);
        assert!(StagePhase::default().is_settled());
    }

    #[test]
    fn test_full_cycle() {
        let phase = StagePhase::Settled.begin_stage();
        assert_eq!(phase, StagePhase::AwaitingEmpty);
        let phase = phase.advance();
        assert_eq!(phase, StagePhase::AwaitingRedistribute);
        let phase = phase.advance();
        assert!(phase.is_settled());
        assert!(phase.advance().is_settled());
    }

    #[test]
    fn test_new_stage_restarts_midway() {
        let phase = StagePhase::AwaitingRedistribute.begin_stage();
        assert_eq!(phase, StagePhase::AwaitingEmpty);
    }
}
