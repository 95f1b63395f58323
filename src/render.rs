//! Plain-text yard view.
//!
//! ```text
//! expert t: 120
//! 4###
//! 12##  7#9#
//! ----------------
//! $: 35
//! ```
//!
//! Every column is two characters wide. A unit covers its footprint with `#`
//! and shows `id % 100` at its left edge. Only the lowest `max_rows` rows are
//! drawn, top row first.

use crate::yard::Yard;

/// Renders `yard` below `caption`.
pub fn render(yard: &Yard, caption: &str, max_rows: usize) -> String {
    let cells = 2 * yard.width();
    let mut grid = vec![vec![' '; cells]; max_rows];

    for unit in yard.units() {
        let Some(loc) = yard.location(unit) else {
            continue;
        };
        if loc.row >= max_rows {
            continue;
        }
        let line = &mut grid[max_rows - 1 - loc.row];
        let start = 2 * loc.column;
        let end = (start + 2 * unit.size).min(cells);
        for cell in &mut line[start..end] {
            *cell = '#';
        }
        for (cell, digit) in line[start..end].iter_mut().zip((unit.id % 100).to_string().chars()) {
            *cell = digit;
        }
    }

    let mut out = String::new();
    out.push_str(caption);
    out.push('\n');
    for line in grid {
        let text: String = line.into_iter().collect();
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out.push_str(&"-".repeat(cells));
    out.push('\n');
    out.push_str(&format!("$: {}\n", yard.cash()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeRange, Unit};

    fn unit(id: u64, size: usize) -> Unit {
        Unit::new(id, size, 5, TimeRange::new(0, 1), TimeRange::new(5, 9))
    }

    #[test]
    fn test_render_stacks() {
        let mut yard = Yard::new(4).unwrap();
        assert!(yard.add(&unit(12, 2), 0));
        assert!(yard.add(&unit(4, 2), 0));
        assert!(yard.add(&unit(107, 1), 3));
        yard.add_cash(35);

        let text = render(&yard, "demo", 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["demo", "", "4###", "12##  7#", "--------", "$: 35"]
        );
    }

    #[test]
    fn test_rows_above_limit_are_hidden() {
        let mut yard = Yard::new(2).unwrap();
        for id in 0..3 {
            assert!(yard.add(&unit(id, 1), 0));
        }
        let text = render(&yard, "", 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1#");
        assert_eq!(lines[2], "0#");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_render_empty() {
        let yard = Yard::new(3).unwrap();
        assert_eq!(render(&yard, "t: 0", 1), "t: 0\n\n------\n$: 0\n");
    }
}
