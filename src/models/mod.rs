//! Yard domain models.
//!
//! Provides the data types shared by the stacking engine, the strategies
//! and the log tooling.
//!
//! # Domain Mappings
//!
//! | u-yard | Port terminal | Warehouse |
//! |--------|---------------|-----------|
//! | Unit | Container | Pallet |
//! | Column | Bay row slot | Floor lane |
//! | Tick | Crane cycle | Forklift move |

mod time;
mod unit;

pub use time::{Tick, TimeRange};
pub use unit::{Unit, UnitId, MAX_UNIT_SIZE, MIN_UNIT_SIZE};
