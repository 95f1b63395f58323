//! Flat-base stacking engine.
//!
//! The yard is a row of `width` columns. Each column is a stack of cells,
//! bottom to top. A unit of size `s` placed at column `p` occupies one cell in
//! each of the columns `p..p+s`, all at the same row.
//!
//! # Cell Representation
//! Column `p` holds a [`Cell::Primary`] entry for the unit; columns
//! `p+1..p+s` hold [`Cell::Occupied`] back-references. Both carry only the unit
//! id; the unit record itself is stored once in the location index, so a
//! footprint cell can never be mistaken for a unit of its own.
//!
//! # Invariants
//! After every operation:
//! 1. A unit sits on a flat base: all its footprint columns had equal height
//!    when it was placed.
//! 2. Footprints lie within `0..width`.
//! 3. A unit is removed only when it is the top cell of every footprint column.
//! 4. Add, remove and move touch all footprint cells or none.
//! 5. `location(u)` is `Some` iff `u` is in the yard, and points at its
//!    primary cell.
//! 6. Cash only grows.
//!
//! # Failure Semantics
//! Malformed arguments (position outside the yard, empty ranges) are
//! [`YardError`]s. Physically impossible operations are silent no-ops that
//! return `false`, so callers can probe many candidate columns cheaply.

mod error;

pub use error::YardError;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

use crate::models::{Unit, UnitId};

/// Position of a unit's primary cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Row (0 = ground level).
    pub row: usize,
    /// Column of the leftmost footprint cell.
    pub column: usize,
}

impl Location {
    /// Creates a new location.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// One stacked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    /// Leftmost footprint cell; owns the unit.
    Primary(UnitId),
    /// Any other footprint cell; only blocks space.
    Occupied(UnitId),
}

impl Cell {
    #[inline]
    fn owner(&self) -> UnitId {
        match *self {
            Cell::Primary(id) | Cell::Occupied(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Placement {
    unit: Unit,
    location: Location,
}

/// The stacking engine.
///
/// # Example
/// ```
/// use u_yard::models::{TimeRange, Unit};
/// use u_yard::yard::{Location, Yard};
///
/// let mut yard = Yard::new(5).unwrap();
/// let unit = Unit::new(1, 2, 10, TimeRange::new(0, 5), TimeRange::new(1, 3));
///
/// assert!(yard.add(&unit, 0));
/// assert_eq!(yard.location(&unit), Some(Location::new(0, 0)));
/// assert_eq!(yard.column_height(1).unwrap(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Yard {
    columns: Vec<Vec<Cell>>,
    placements: HashMap<UnitId, Placement>,
    cash: u64,
}

impl Yard {
    /// Creates an empty yard with `width` columns.
    pub fn new(width: usize) -> Result<Self, YardError> {
        if width == 0 {
            return Err(YardError::ZeroWidth);
        }
        Ok(Self {
            columns: vec![Vec::new(); width],
            placements: HashMap::new(),
            cash: 0,
        })
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Height of the tallest column.
    pub fn height(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of units in the yard.
    #[inline]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the yard holds no unit.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Accumulated cash.
    #[inline]
    pub fn cash(&self) -> u64 {
        self.cash
    }

    /// Adds `amount` to the cash.
    pub fn add_cash(&mut self, amount: u64) {
        self.cash = self.cash.saturating_add(amount);
    }

    /// Whether the unit is in the yard.
    #[inline]
    pub fn contains(&self, unit: &Unit) -> bool {
        self.placements.contains_key(&unit.id)
    }

    /// Location of the unit's primary cell, `None` if not in the yard.
    pub fn location(&self, unit: &Unit) -> Option<Location> {
        self.placements.get(&unit.id).map(|p| p.location)
    }

    /// Columns covered by the unit, `None` if not in the yard.
    pub fn footprint(&self, unit: &Unit) -> Option<Range<usize>> {
        self.placements
            .get(&unit.id)
            .map(|p| p.location.column..p.location.column + p.unit.size)
    }

    /// The stored record of a unit in the yard.
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.placements.get(&id).map(|p| &p.unit)
    }

    // ---- queries over columns ----

    /// Number of cells in column `p`.
    pub fn column_height(&self, p: usize) -> Result<usize, YardError> {
        self.check_position(p)?;
        Ok(self.columns[p].len())
    }

    /// Lowest column height in `range`.
    pub fn min_height(&self, range: Range<usize>) -> Result<usize, YardError> {
        self.check_range(&range)?;
        Ok(self.columns[range].iter().map(Vec::len).min().unwrap_or(0))
    }

    /// Highest column height in `range`.
    pub fn max_height(&self, range: Range<usize>) -> Result<usize, YardError> {
        self.check_range(&range)?;
        Ok(self.columns[range].iter().map(Vec::len).max().unwrap_or(0))
    }

    /// The unit on top of column `p`, `None` if the column is empty.
    ///
    /// If the top cell belongs to a wider unit placed further left, that
    /// unit is returned.
    pub fn top(&self, p: usize) -> Result<Option<&Unit>, YardError> {
        self.check_position(p)?;
        Ok(self.columns[p]
            .last()
            .and_then(|cell| self.get(cell.owner())))
    }

    /// Units crossing column `p`, bottom to top.
    pub fn column_units(&self, p: usize) -> Result<Vec<&Unit>, YardError> {
        self.check_position(p)?;
        Ok(self.columns[p]
            .iter()
            .filter_map(|cell| self.get(cell.owner()))
            .collect())
    }

    /// All units, ordered by column then row.
    pub fn units(&self) -> Vec<&Unit> {
        let mut placed: Vec<&Placement> = self.placements.values().collect();
        placed.sort_by_key(|p| (p.location.column, p.location.row));
        placed.into_iter().map(|p| &p.unit).collect()
    }

    /// Units that can be removed right now, left to right.
    pub fn removable_units(&self) -> Vec<&Unit> {
        let mut seen = Vec::new();
        for column in &self.columns {
            if let Some(Cell::Primary(id)) = column.last() {
                if let Some(unit) = self.get(*id) {
                    if self.can_remove(unit) {
                        seen.push(unit);
                    }
                }
            }
        }
        seen
    }

    // ---- feasibility ----

    /// Whether `unit` (not yet in the yard) can be placed at column `p`.
    ///
    /// Requires `p + size <= width` and equal heights over `p..p+size`.
    pub fn can_add(&self, unit: &Unit, p: usize) -> bool {
        !self.contains(unit) && self.landing_row(unit, p).is_some()
    }

    /// Whether `unit` is in the yard and is the top cell of every column of
    /// its footprint.
    pub fn can_remove(&self, unit: &Unit) -> bool {
        let Some(placed) = self.placements.get(&unit.id) else {
            return false;
        };
        let loc = placed.location;
        (loc.column..loc.column + placed.unit.size).all(|c| {
            matches!(self.columns.get(c), Some(col) if col.len() == loc.row + 1)
        })
    }

    /// Whether `unit` can be lifted and set down at column `p`.
    ///
    /// The destination needs a flat base as the yard stands now, and the
    /// unit must still land flat once it has been lifted. A destination that
    /// overlaps the unit's own footprint is therefore only accepted at the
    /// unit's current column.
    pub fn can_move(&self, unit: &Unit, p: usize) -> bool {
        self.contains(unit) && self.landing_row(unit, p).is_some()
    }

    /// Row at which `unit` would come to rest at column `p`.
    ///
    /// `None` when the footprint leaves the yard or the base at `p` is
    /// uneven. For a unit already in the yard the base must be flat both
    /// before and after lifting it, and the returned row is the one it lands
    /// on once lifted; `None` if it cannot be lifted.
    pub fn landing_row(&self, unit: &Unit, p: usize) -> Option<usize> {
        let (size, lifted) = match self.placements.get(&unit.id) {
            Some(placed) => {
                if !self.can_remove(unit) {
                    return None;
                }
                let c = placed.location.column;
                (placed.unit.size, c..c + placed.unit.size)
            }
            None => (unit.size, 0..0),
        };
        if size == 0 || p.checked_add(size)? > self.width() {
            return None;
        }
        let base = &self.columns[p..p + size];
        let row = base[0].len();
        if base.iter().any(|column| column.len() != row) {
            return None;
        }
        let height_at = |c: usize| self.columns[c].len() - usize::from(lifted.contains(&c));
        let row = height_at(p);
        (p + 1..p + size).all(|c| height_at(c) == row).then_some(row)
    }

    // ---- mutations ----

    /// Places `unit` at column `p`. Returns `false` (and changes nothing)
    /// unless [`can_add`](Self::can_add) holds.
    pub fn add(&mut self, unit: &Unit, p: usize) -> bool {
        if !self.can_add(unit, p) {
            return false;
        }
        self.stack(*unit, p);
        true
    }

    /// Removes `unit`. Returns `false` (and changes nothing) unless
    /// [`can_remove`](Self::can_remove) holds.
    pub fn remove(&mut self, unit: &Unit) -> bool {
        if !self.can_remove(unit) {
            return false;
        }
        self.lift(unit.id).is_some()
    }

    /// Moves `unit` to column `p`.
    ///
    /// Returns `Ok(false)` (and changes nothing) unless
    /// [`can_move`](Self::can_move) holds. Feasibility is decided before any
    /// cell is touched, so the unit is never left half-moved.
    pub fn move_unit(&mut self, unit: &Unit, p: usize) -> Result<bool, YardError> {
        self.check_position(p)?;
        if !self.can_move(unit, p) {
            return Ok(false);
        }
        match self.lift(unit.id) {
            Some(record) => {
                self.stack(record, p);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Pushes the footprint cells of `unit` at `p`. Caller checked feasibility.
    fn stack(&mut self, unit: Unit, p: usize) {
        let row = self.columns[p].len();
        self.columns[p].push(Cell::Primary(unit.id));
        for column in &mut self.columns[p + 1..p + unit.size] {
            column.push(Cell::Occupied(unit.id));
        }
        self.placements.insert(
            unit.id,
            Placement {
                unit,
                location: Location::new(row, p),
            },
        );
    }

    /// Pops the footprint cells of a removable unit. Caller checked feasibility.
    fn lift(&mut self, id: UnitId) -> Option<Unit> {
        let placed = self.placements.remove(&id)?;
        let c = placed.location.column;
        for column in &mut self.columns[c..c + placed.unit.size] {
            let cell = column.pop();
            debug_assert_eq!(cell.map(|cell| cell.owner()), Some(id));
        }
        Some(placed.unit)
    }

    // ---- argument checks ----

    fn check_position(&self, p: usize) -> Result<(), YardError> {
        if p >= self.width() {
            return Err(YardError::PositionOutOfRange {
                position: p,
                width: self.width(),
            });
        }
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), YardError> {
        if range.start >= range.end || range.end > self.width() {
            return Err(YardError::InvalidRange {
                start: range.start,
                end: range.end,
                width: self.width(),
            });
        }
        Ok(())
    }
}
