//! Stacking engine errors.
//!
//! Only malformed arguments are errors. Physically impossible operations
//! (uneven base, unit buried under another) are reported as "not applied".

use thiserror::Error;

/// A malformed argument to a yard operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YardError {
    /// The yard must have at least one column.
    #[error("yard width must be greater than 0")]
    ZeroWidth,

    /// A column index outside `0..width`.
    #[error("position {position} is outside the yard (width {width})")]
    PositionOutOfRange { position: usize, width: usize },

    /// A column range that is empty or exceeds the yard.
    #[error("column range {start}..{end} is invalid for a yard of width {width}")]
    InvalidRange {
        start: usize,
        end: usize,
        width: usize,
    },
}
