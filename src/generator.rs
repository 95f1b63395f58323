//! Seeded random unit streams.
//!
//! # Distribution
//!
//! For unit `i` of `count`:
//!
//! | Field | Draw |
//! |-------|------|
//! | size | uniform `1..=4` |
//! | value | `1 + ⌊Exp(mean 10)⌋` |
//! | arrival | `[now, now + step)`, `step = 1 + ⌊Exp(mean 24)⌋` |
//! | delivery start | `now + ⌊Exp(mean m)⌋` |
//! | delivery end | `start + ⌊Exp(mean m)⌋ + 1` |
//!
//! with `m = U[1000, 6000) + (count - i) / 5`, so early units wait longer.
//! `now` advances by `step` after each unit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;

use crate::models::{Tick, TimeRange, Unit, MAX_UNIT_SIZE, MIN_UNIT_SIZE};

const MEAN_VALUE: f64 = 10.0;
const MEAN_STEP: f64 = 24.0;
const MIN_DELIVERY_MEAN: u32 = 1000;
const MAX_DELIVERY_MEAN: u32 = 6000;

/// Reproducible generator of unit streams.
///
/// # Example
/// ```
/// use u_yard::generator::UnitGenerator;
///
/// let a = UnitGenerator::new(7).generate(50);
/// let b = UnitGenerator::new(7).generate(50);
/// assert_eq!(a.len(), 50);
/// assert!(a.iter().zip(&b).all(|(x, y)| x.delivery == y.delivery));
/// ```
#[derive(Debug, Clone)]
pub struct UnitGenerator {
    rng: StdRng,
}

impl UnitGenerator {
    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `⌊Exp(mean)⌋`.
    fn exp_floor(&mut self, mean: f64) -> Tick {
        let x: f64 = self.rng.sample(Exp1);
        (x * mean) as Tick
    }

    /// Generates `count` units with ids `0..count`, ordered by arrival.
    pub fn generate(&mut self, count: usize) -> Vec<Unit> {
        let mut now: Tick = 0;
        let mut units = Vec::with_capacity(count);
        for i in 0..count {
            let size = self.rng.random_range(MIN_UNIT_SIZE..=MAX_UNIT_SIZE);
            let value = 1 + self.exp_floor(MEAN_VALUE);
            let step = 1 + self.exp_floor(MEAN_STEP);

            let base = self.rng.random_range(MIN_DELIVERY_MEAN..MAX_DELIVERY_MEAN);
            let mean = f64::from(base) + (count - i) as f64 / 5.0;
            let begin = now + self.exp_floor(mean);
            let end = begin + self.exp_floor(mean) + 1;

            units.push(Unit::new(
                i as u64,
                size,
                value,
                TimeRange::new(now, now + step),
                TimeRange::new(begin, end),
            ));
            now += step;
        }
        units
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_units;

    #[test]
    fn test_deterministic() {
        let a = UnitGenerator::new(42).generate(200);
        let b = UnitGenerator::new(42).generate(200);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.size, y.size);
            assert_eq!(x.value, y.value);
            assert_eq!(x.arrival, y.arrival);
            assert_eq!(x.delivery, y.delivery);
        }
    }

    #[test]
    fn test_stream_is_well_formed() {
        let units = UnitGenerator::new(1).generate(500);
        assert_eq!(units.len(), 500);
        assert!(validate_units(&units).is_ok());
        for (i, u) in units.iter().enumerate() {
            assert_eq!(u.id, i as u64);
            assert!(u.value >= 1);
            assert!(u.delivery.start >= u.arrival.start);
        }
        // Arrival windows tile the timeline
        for pair in units.windows(2) {
            assert_eq!(pair[0].arrival.end, pair[1].arrival.start);
        }
    }

    #[test]
    fn test_empty() {
        assert!(UnitGenerator::new(0).generate(0).is_empty());
    }
}
