//! Parameters for the simulated mechanisms

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the whole simulated mechanism set.
#[derive(Debug, Clone, Deserialize)]
pub struct SimMechParams {
    pub elevator: SimAxisParams,
    pub pivot: SimAxisParams,
    pub effector: SimAxisParams,

    /// Time the effector has to pull inwards before the break-beam trips, and has to push
    /// outwards before it clears again.
    ///
    /// Units: seconds
    pub beam_trip_time_s: f64,

    /// Whether an object is already held when the simulation starts.
    #[serde(default)]
    pub start_with_object: bool,

    /// Distance from the bottom of the elevator's travel within which the bottom limit switch is
    /// pressed.
    ///
    /// Units: meters
    pub bottom_limit_band_m: f64,
}

/// Parameters for one simulated axis.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SimAxisParams {
    /// Lowest reachable value
    pub min: f64,

    /// Highest reachable value
    pub max: f64,

    /// Maximum rate of change of the value, per second
    pub max_rate: f64,

    /// Value at the start of the simulation
    pub start: f64,
}
