//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the manipulator software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand definitions, including the operator-facing supersystem commands
pub mod tc;

/// Demand and sensor data definitions for equipment (the mechanisms)
pub mod eqpt;
