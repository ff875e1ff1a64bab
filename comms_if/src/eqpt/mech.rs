//! # Mechanisms Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const ACT_IDS: [ActId; 3] = [ActId::Elevator, ActId::Pivot, ActId::Effector];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands that are sent to the mechanism controllers on every cycle.
///
/// Units depend on the actuator:
/// - `Elevator`: meters above the bottom of travel
/// - `Pivot`: radians from the arm's zero position
/// - `Effector`: volts applied to the gripper rollers, positive pulls inwards
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MechDems {
    /// The demanded absolute target of each actuator.
    pub target: HashMap<ActId, f64>,
}

/// Sensor data returned by the mechanism controllers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MechSensData {
    /// The measured position of each actuator, in the same units as [`MechDems`].
    pub pos: HashMap<ActId, f64>,

    /// True when the break-beam in the effector is broken, i.e. an object is held.
    pub beam_broken: bool,

    /// True when the elevator's bottom limit switch is pressed.
    pub bottom_limit: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators on the manipulator
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    Elevator,
    Pivot,
    Effector,
}

/// Response from the mechanism controllers based on the demands sent to them.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum MechDemsResponse {
    /// Demands were valid and will be executed
    DemsOk,

    /// Demands were invalid and have been rejected
    DemsInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl ActId {
    /// All actuators of the manipulator, in a fixed order.
    pub fn all() -> &'static [ActId; 3] {
        &ACT_IDS
    }
}

impl MechDems {
    /// Build a full set of demands from the three axis targets.
    pub fn new(height_m: f64, angle_rad: f64, effector_v: f64) -> Self {
        let mut target = HashMap::new();

        target.insert(ActId::Elevator, height_m);
        target.insert(ActId::Pivot, angle_rad);
        target.insert(ActId::Effector, effector_v);

        Self { target }
    }

    /// Get the demand for a single actuator, if one was set.
    pub fn get(&self, act_id: ActId) -> Option<f64> {
        self.target.get(&act_id).copied()
    }

    /// Returns true if every actuator has a finite demand.
    pub fn is_valid(&self) -> bool {
        ActId::all()
            .iter()
            .all(|id| self.get(*id).map(f64::is_finite).unwrap_or(false))
    }
}

impl Default for MechDems {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl MechSensData {
    /// Measured position of the given actuator, zero if it was not reported.
    pub fn pos_of(&self, act_id: ActId) -> f64 {
        self.pos.get(&act_id).copied().unwrap_or_default()
    }
}

impl Default for MechSensData {
    fn default() -> Self {
        let mut pos = HashMap::new();

        for act_id in ActId::all().iter() {
            pos.insert(*act_id, 0.0);
        }

        Self {
            pos,
            beam_broken: false,
            bottom_limit: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dems_cover_every_actuator() {
        let dems = MechDems::new(0.4, 0.2, -3.0);

        assert_eq!(dems.get(ActId::Elevator), Some(0.4));
        assert_eq!(dems.get(ActId::Pivot), Some(0.2));
        assert_eq!(dems.get(ActId::Effector), Some(-3.0));
        assert!(dems.is_valid());
    }

    #[test]
    fn test_non_finite_dems_invalid() {
        let mut dems = MechDems::default();
        dems.target.insert(ActId::Pivot, f64::NAN);
        assert!(!dems.is_valid());

        dems.target.remove(&ActId::Pivot);
        assert!(!dems.is_valid());
    }
}
