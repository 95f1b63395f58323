//! Cargo unit model.
//!
//! A unit is one physical container: it arrives during its arrival window,
//! occupies `size` adjacent columns of the yard, and pays `value` if it leaves
//! the yard during its delivery window. Once its delivery window has passed it
//! is expired and can only be removed without payment.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::{Tick, TimeRange};

/// Unit identifier.
pub type UnitId = u64;

/// Smallest allowed footprint.
pub const MIN_UNIT_SIZE: usize = 1;

/// Largest allowed footprint.
pub const MAX_UNIT_SIZE: usize = 4;

/// An immutable cargo unit.
///
/// Two units are equal iff they share the same `id`; the remaining fields are
/// payload. Structural checks (size range, non-empty windows) are done by
/// [`validate_units`](crate::validation::validate_units), not here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Footprint width in columns (1..=4).
    pub size: usize,
    /// Payment received on delivery.
    pub value: u64,
    /// Window in which the unit is offered to the yard.
    pub arrival: TimeRange,
    /// Window in which the unit can be delivered.
    pub delivery: TimeRange,
}

impl Unit {
    /// Creates a new unit.
    pub fn new(
        id: UnitId,
        size: usize,
        value: u64,
        arrival: TimeRange,
        delivery: TimeRange,
    ) -> Self {
        Self {
            id,
            size,
            value,
            arrival,
            delivery,
        }
    }

    /// Whether the delivery window has passed (`time >= delivery.end`).
    #[inline]
    pub fn is_expired(&self, time: Tick) -> bool {
        time >= self.delivery.end
    }

    /// Whether the unit can be delivered at `time`.
    #[inline]
    pub fn is_deliverable(&self, time: Tick) -> bool {
        self.delivery.contains(time)
    }

    /// Value earned per occupied column (integer division).
    #[inline]
    pub fn value_density(&self) -> u64 {
        self.value / self.size.max(1) as u64
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
