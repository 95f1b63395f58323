//! Unit stream files.
//!
//! One unit per line, seven whitespace-separated integers:
//!
//! ```text
//! id size value arrival_start arrival_end delivery_start delivery_end
//! ```
//!
//! Blank lines are ignored. Records are returned in file order; use
//! [`validate_units`](crate::validation::validate_units) for structural checks.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

use crate::models::{TimeRange, Unit};

/// Fields per record.
const FIELDS: usize = 7;

/// Failure reading a unit file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O failure.
    #[error("unit file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Wrong number of fields (1-based line number).
    #[error("line {line}: expected {FIELDS} fields, found {found}")]
    FieldCount { line: usize, found: usize },

    /// A field is not a non-negative integer (1-based line number).
    #[error("line {line}: invalid integer '{token}'")]
    InvalidInteger { line: usize, token: String },
}

fn parse_record(line_no: usize, line: &str) -> Result<Unit, LoadError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != FIELDS {
        return Err(LoadError::FieldCount {
            line: line_no,
            found: tokens.len(),
        });
    }
    let mut values = [0u64; FIELDS];
    for (slot, token) in values.iter_mut().zip(&tokens) {
        *slot = token.parse().map_err(|_| LoadError::InvalidInteger {
            line: line_no,
            token: (*token).to_string(),
        })?;
    }
    let [id, size, value, a0, a1, d0, d1] = values;
    let size = usize::try_from(size).map_err(|_| LoadError::InvalidInteger {
        line: line_no,
        token: tokens[1].to_string(),
    })?;
    Ok(Unit::new(
        id,
        size,
        value,
        TimeRange::new(a0, a1),
        TimeRange::new(d0, d1),
    ))
}

/// Reads all records from a buffered reader.
pub fn read_units<R: BufRead>(reader: R) -> Result<Vec<Unit>, LoadError> {
    let mut units = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        units.push(parse_record(index + 1, &line)?);
    }
    Ok(units)
}

/// Reads all records from a file.
pub fn load_units(path: impl AsRef<Path>) -> Result<Vec<Unit>, LoadError> {
    let file = File::open(path)?;
    read_units(BufReader::new(file))
}

/// Reads all records from a string.
pub fn parse_units(text: &str) -> Result<Vec<Unit>, LoadError> {
    read_units(text.as_bytes())
}

/// Writes records in the same format, one per line.
pub fn write_units<W: Write>(mut writer: W, units: &[Unit]) -> io::Result<()> {
    for u in units {
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            u.id, u.size, u.value, u.arrival.start, u.arrival.end, u.delivery.start, u.delivery.end
        )?;
    }
    writer.flush()
}
