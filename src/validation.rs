//! Input validation for unit streams.
//!
//! Checks structural integrity of unit records before a run. Detects:
//! - Duplicate IDs
//! - Sizes outside `1..=4`
//! - Empty arrival or delivery windows
//! - Arrival starts that go back in time along the stream
//!
//! Strategies tolerate all of these (an unfit unit is simply never placed),
//! but the replay validator and the KPIs assume a well-formed stream.

use std::collections::HashSet;

use crate::models::{Unit, MAX_UNIT_SIZE, MIN_UNIT_SIZE};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two units share the same ID.
    DuplicateId,
    /// Footprint outside the supported range.
    InvalidSize,
    /// A window with `end <= start`.
    EmptyWindow,
    /// A unit arrives earlier than its predecessor in the stream.
    UnorderedArrival,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a unit stream.
///
/// Checks:
/// 1. No duplicate unit IDs
/// 2. Every size is within `1..=4`
/// 3. Arrival and delivery windows are non-empty
/// 4. Arrival starts are non-decreasing in stream order
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_units(units: &[Unit]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for unit in units {
        if !ids.insert(unit.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate unit ID: {}", unit.id),
            ));
        }

        if !(MIN_UNIT_SIZE..=MAX_UNIT_SIZE).contains(&unit.size) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSize,
                format!(
                    "Unit {} has size {}, expected {MIN_UNIT_SIZE}..={MAX_UNIT_SIZE}",
                    unit.id, unit.size
                ),
            ));
        }

        for (name, window) in [("arrival", unit.arrival), ("delivery", unit.delivery)] {
            if window.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyWindow,
                    format!(
                        "Unit {} has an empty {name} window [{}, {})",
                        unit.id, window.start, window.end
                    ),
                ));
            }
        }
    }

    for pair in units.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.arrival.start < prev.arrival.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnorderedArrival,
                format!(
                    "Unit {} arrives at {} before unit {} at {}",
                    next.id, next.arrival.start, prev.id, prev.arrival.start
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeRange, UnitId};

    fn unit(id: UnitId, size: usize, arrival: (u64, u64), delivery: (u64, u64)) -> Unit {
        Unit::new(
            id,
            size,
            10,
            TimeRange::new(arrival.0, arrival.1),
            TimeRange::new(delivery.0, delivery.1),
        )
    }

    fn sample_units() -> Vec<Unit> {
        vec![
            unit(0, 1, (0, 5), (20, 40)),
            unit(1, 4, (3, 9), (50, 60)),
            unit(2, 2, (3, 4), (10, 11)),
        ]
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_units(&sample_units()).is_ok());
        assert!(validate_units(&[]).is_ok());
    }

    #[test]
    fn test_duplicate_id() {
        let mut units = sample_units();
        units.push(unit(1, 1, (9, 10), (20, 30)));
        let errors = validate_units(&units).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId);
    }

    #[test]
    fn test_invalid_size() {
        let errors = validate_units(&[unit(0, 0, (0, 1), (2, 3)), unit(1, 5, (0, 1), (2, 3))])
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::InvalidSize));
    }

    #[test]
    fn test_empty_windows() {
        let errors = validate_units(&[unit(0, 1, (4, 4), (9, 3))]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("arrival"));
        assert!(errors[1].message.contains("delivery"));
    }

    #[test]
    fn test_unordered_arrival() {
        let units = vec![unit(0, 1, (10, 12), (20, 30)), unit(1, 1, (5, 12), (20, 30))];
        let errors = validate_units(&units).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnorderedArrival));
    }

    #[test]
    fn test_multiple_errors() {
        let units = vec![
            unit(7, 9, (10, 12), (20, 30)),
            unit(7, 1, (0, 0), (20, 30)),
        ];
        let errors = validate_units(&units).unwrap_err();
        // duplicate, size, empty arrival, order
        assert_eq!(errors.len(), 4);
    }
}
