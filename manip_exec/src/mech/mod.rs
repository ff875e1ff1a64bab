//! # Mechanisms module
//!
//! The supersystem only ever talks to the three manipulator mechanisms through the [`Mechanism`]
//! trait, so the simulated mechanisms in [`sim`] can be swapped for hardware drivers without
//! touching the coordination logic.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::ActId;
use serde::Serialize;

pub use params::*;
pub use sim::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A physical end of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TravelLimit {
    Lower,
    Upper,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single position (or, for the effector, voltage) controlled mechanism.
pub trait Mechanism {
    /// The actuator this mechanism drives.
    fn id(&self) -> ActId;

    /// Command an absolute target. Commanding the same target repeatedly has no further effect,
    /// and targets outside of the mechanism's travel are clamped to it.
    fn command_target(&mut self, target: f64);

    /// The most recently measured value.
    fn position(&self) -> f64;

    /// True if the measured value is within `tolerance` of `target`.
    fn at_target(&self, target: f64, tolerance: f64) -> bool {
        (self.position() - target).abs() <= tolerance
    }

    /// The end of travel the mechanism is resting on, if any.
    fn at_limit(&self) -> Option<TravelLimit>;
}
