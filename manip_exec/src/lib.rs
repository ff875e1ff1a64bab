//! # Manipulator library.
//!
//! This library allows other crates in the workspace (and the integration tests) to access items
//! defined inside the manipulator crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable
pub mod data_store;

/// Mechanism contract and the simulated mechanism set
pub mod mech;

/// Executable parameters
pub mod params;

/// Supersystem coordination - turns operator intents into concurrent mechanism targets
pub mod supersys;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target period of one cycle.
pub const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
pub const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;
