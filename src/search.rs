//! Greedy column search.
//!
//! Pure functions over a [`Yard`] snapshot used by the strategies to pick
//! destinations and move candidates. They never mutate the yard.
//!
//! # Algorithm
//! Linear scan over the candidate columns. The yard width is a small,
//! configured constant, so every decision recomputes from scratch.
//!
//! # Complexity
//! `lowest_column`: O(w * s) for range width w and unit size s.
//! `first_movable`: O(w² * s).

use std::ops::Range;

use crate::models::Unit;
use crate::yard::Yard;

/// Column in `range` where `unit` lands lowest.
///
/// Only columns whose whole footprint stays inside `range` are considered.
/// A unit already in the yard is only offered columns it can legally move
/// to (see [`Yard::landing_row`]). Columns are scanned from the right end of the
/// range; on equal landing rows the rightmost column wins.
///
/// Returns `None` if no column in `range` admits the unit.
///
/// # Example
/// ```
/// use u_yard::models::{TimeRange, Unit};
/// use u_yard::search::lowest_column;
/// use u_yard::yard::Yard;
///
/// let mut yard = Yard::new(4).unwrap();
/// let a = Unit::new(1, 1, 5, TimeRange::new(0, 1), TimeRange::new(5, 9));
/// yard.add(&a, 3);
///
/// let b = Unit::new(2, 1, 5, TimeRange::new(0, 1), TimeRange::new(5, 9));
/// assert_eq!(lowest_column(&yard, &b, 0..4), Some(2));
/// ```
pub fn lowest_column(yard: &Yard, unit: &Unit, range: Range<usize>) -> Option<usize> {
    let size = yard.get(unit.id).map_or(unit.size, |u| u.size);
    let end = range.end.min(yard.width());
    if size == 0 || end < size {
        return None;
    }
    let last_start = end - size;
    if last_start < range.start {
        return None;
    }

    let mut best: Option<(usize, usize)> = None; // (row, column)
    for p in (range.start..=last_start).rev() {
        if let Some(row) = yard.landing_row(unit, p) {
            if best.map_or(true, |(best_row, _)| row < best_row) {
                best = Some((row, p));
            }
        }
    }
    best.map(|(_, p)| p)
}

/// First removable top in `from` (left to right) that fits somewhere in
/// `to`, together with its lowest destination column.
///
/// Units rejected by `accept` are skipped.
pub fn first_movable<F>(
    yard: &Yard,
    from: Range<usize>,
    to: Range<usize>,
    mut accept: F,
) -> Option<(Unit, usize)>
where
    F: FnMut(&Unit) -> bool,
{
    let end = from.end.min(yard.width());
    for p in from.start..end {
        let Ok(Some(top)) = yard.top(p) else {
            continue;
        };
        if !yard.can_remove(top) || !accept(top) {
            continue;
        }
        if let Some(dest) = lowest_column(yard, top, to.clone()) {
            return Some((*top, dest));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeRange, UnitId};
    use proptest::prelude::*;

    fn unit(id: UnitId, size: usize) -> Unit {
        Unit::new(id, size, 10, TimeRange::new(0, 1), TimeRange::new(10, 20))
    }

    #[test]
    fn test_lowest_prefers_low_column() {
        let mut yard = Yard::new(5).unwrap();
        assert!(yard.add(&unit(1, 1), 0));
        assert!(yard.add(&unit(2, 1), 0));
        assert!(yard.add(&unit(3, 1), 1));
        // heights: [2, 1, 0, 0, 0]
        assert_eq!(lowest_column(&yard, &unit(9, 1), 0..2), Some(1));
    }

    #[test]
    fn test_ties_go_to_rightmost() {
        let yard = Yard::new(5).unwrap();
        assert_eq!(lowest_column(&yard, &unit(9, 1), 0..5), Some(4));
        assert_eq!(lowest_column(&yard, &unit(9, 2), 0..5), Some(3));
    }

    #[test]
    fn test_footprint_stays_in_range() {
        let yard = Yard::new(10).unwrap();
        assert_eq!(lowest_column(&yard, &unit(9, 4), 0..5), Some(1));
        assert_eq!(lowest_column(&yard, &unit(9, 4), 2..5), None);
        assert_eq!(lowest_column(&yard, &unit(9, 3), 7..12), Some(7));
    }

    #[test]
    fn test_no_flat_base() {
        let mut yard = Yard::new(3).unwrap();
        assert!(yard.add(&unit(1, 1), 1));
        // heights [0, 1, 0]: a size-2 unit has no flat base
        assert_eq!(lowest_column(&yard, &unit(9, 2), 0..3), None);
    }

    #[test]
    fn test_first_movable() {
        let mut yard = Yard::new(6).unwrap();
        let buried = unit(1, 1);
        let top = unit(2, 1);
        assert!(yard.add(&buried, 0));
        assert!(yard.add(&top, 0));
        assert!(yard.add(&unit(3, 2), 1));

        let (u, dest) = first_movable(&yard, 0..3, 3..6, |_| true).unwrap();
        assert_eq!(u.id, 2);
        assert_eq!(dest, 5);

        // Filter skips unit 2, next candidate is unit 3 (spanning 1..3)
        let (u, dest) = first_movable(&yard, 0..3, 3..6, |u| u.id != 2).unwrap();
        assert_eq!(u.id, 3);
        assert_eq!(dest, 4);

        assert!(first_movable(&yard, 3..6, 0..3, |_| true).is_none());
    }

    proptest! {
        #[test]
        fn prop_lowest_column_is_admissible_and_minimal(
            placements in proptest::collection::vec((1usize..=4, 0usize..12), 0..30),
            size in 1usize..=4,
            start in 0usize..12,
            len in 1usize..12,
        ) {
            let mut yard = Yard::new(12).unwrap();
            for (i, (s, p)) in placements.iter().enumerate() {
                yard.add(&unit(i as UnitId, *s), *p);
            }
            let probe = unit(1000, size);
            let range = start..(start + len).min(12);

            match lowest_column(&yard, &probe, range.clone()) {
                Some(p) => {
                    prop_assert!(range.contains(&p));
                    prop_assert!(p + size <= range.end);
                    prop_assert!(yard.can_add(&probe, p));
                    let row = yard.landing_row(&probe, p).unwrap();
                    for q in range.start..=range.end.saturating_sub(size) {
                        if let Some(other) = yard.landing_row(&probe, q) {
                            prop_assert!(other >= row);
                        }
                    }
                }
                None => {
                    for q in range.clone() {
                        prop_assert!(q + size > range.end || !yard.can_add(&probe, q));
                    }
                }
            }
        }
    }
}
