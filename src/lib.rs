//! Container yard simulation for the U-Engine ecosystem.
//!
//! Units of cargo arrive over discrete time, are stacked in a fixed-width
//! yard under physical constraints (flat base, top-only access) and pay
//! their value when delivered inside their delivery window. Strategies
//! decide, within the time budget of each arrival, where to place units and
//! how to reshuffle the yard; every applied action is written to a
//! replayable log.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Unit`, `TimeRange`, `Tick`
//! - **`yard`**: Stacking engine with multi-column footprints
//! - **`search`**: Greedy column search used by the strategies
//! - **`config`**: Strategy configuration (serde-loadable)
//! - **`log`**: Action log lines, sinks and reader
//! - **`scheduler`**: Staged and simple strategies, crane executor, KPIs
//! - **`loader`**: Unit file parsing and writing
//! - **`validation`**: Structural checks of unit streams
//! - **`replay`**: Offline log validator
//! - **`render`**: Plain-text yard view
//! - **`generator`**: Seeded random unit streams
//!
//! # Architecture
//!
//! The yard never fails on an infeasible stacking operation; it reports
//! `false` and stays unchanged. Malformed arguments (zero width, column out
//! of range) are errors. Strategies drive the yard only through the
//! [`scheduler::Crane`], which enforces the time budget and logs what it
//! applies.
//!
//! # References
//!
//! - Dekker, Voogd & van Asperen (2006), "Advanced methods for container stacking"
//! - Carlo, Vis & Roodbergen (2014), "Storage yard operations in container terminals"

pub mod config;
pub mod generator;
pub mod loader;
pub mod log;
pub mod models;
pub mod render;
pub mod replay;
pub mod scheduler;
pub mod search;
pub mod validation;
pub mod yard;
