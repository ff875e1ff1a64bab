//! Supersystem coordinator
//!
//! The coordinator owns the one live [`MechTarget`]. Every entry point mutates the target first and
//! then returns an [`Action`] which drives all three mechanisms to it together.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{eqpt::mech::MechDems, tc::supersys::PresetId};
use serde::Serialize;

use super::table::PresetTable;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The last commanded target of every mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MechTarget {
    /// Units: meters
    pub height_m: f64,

    /// Units: radians
    pub angle_rad: f64,

    /// Units: volts
    pub effector_v: f64,
}

/// A partial update of the target, `None` fields keep their last commanded value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetUpdate {
    pub height_m: Option<f64>,
    pub angle_rad: Option<f64>,
    pub effector_v: Option<f64>,
}

/// Drive every mechanism to a target, in the same cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub target: MechTarget,
}

/// Owner of the manipulator's target.
#[derive(Debug, Clone)]
pub struct Coordinator {
    target: MechTarget,
    table: PresetTable,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MechTarget {
    pub fn dems(&self) -> MechDems {
        MechDems::new(self.height_m, self.angle_rad, self.effector_v)
    }
}

impl TargetUpdate {
    pub fn state(height_m: f64, angle_rad: f64, effector_v: f64) -> Self {
        Self {
            height_m: Some(height_m),
            angle_rad: Some(angle_rad),
            effector_v: Some(effector_v),
        }
    }

    /// Height and angle, keeping the effector.
    pub fn position(height_m: f64, angle_rad: f64) -> Self {
        Self {
            height_m: Some(height_m),
            angle_rad: Some(angle_rad),
            effector_v: None,
        }
    }

    pub fn height(height_m: f64) -> Self {
        Self {
            height_m: Some(height_m),
            ..Default::default()
        }
    }

    pub fn angle(angle_rad: f64) -> Self {
        Self {
            angle_rad: Some(angle_rad),
            ..Default::default()
        }
    }

    pub fn effector(effector_v: f64) -> Self {
        Self {
            effector_v: Some(effector_v),
            ..Default::default()
        }
    }

    /// Replace the effector part of the update.
    pub fn with_effector(mut self, effector_v: f64) -> Self {
        self.effector_v = Some(effector_v);
        self
    }

    fn apply(&self, target: &mut MechTarget) {
        if let Some(h) = self.height_m {
            target.height_m = h;
        }
        if let Some(a) = self.angle_rad {
            target.angle_rad = a;
        }
        if let Some(e) = self.effector_v {
            target.effector_v = e;
        }
    }
}

impl Action {
    pub fn dems(&self) -> MechDems {
        self.target.dems()
    }
}

impl Coordinator {
    /// Create a new coordinator, starting in the stowed configuration with the effector stopped.
    pub fn new(table: PresetTable) -> Self {
        let stow = table.get(PresetId::Stow);

        Self {
            target: MechTarget {
                height_m: stow.height_m,
                angle_rad: stow.angle_rad,
                effector_v: 0.0,
            },
            table,
        }
    }

    /// The last commanded target.
    pub fn target(&self) -> MechTarget {
        self.target
    }

    pub fn presets(&self) -> &PresetTable {
        &self.table
    }

    /// Apply a partial update and drive to the result.
    pub fn update(&mut self, update: TargetUpdate) -> Action {
        update.apply(&mut self.target);

        Action {
            target: self.target,
        }
    }

    pub fn set_state(&mut self, height_m: f64, angle_rad: f64, effector_v: f64) -> Action {
        self.update(TargetUpdate::state(height_m, angle_rad, effector_v))
    }

    pub fn set_position(&mut self, height_m: f64, angle_rad: f64) -> Action {
        self.update(TargetUpdate::position(height_m, angle_rad))
    }

    pub fn set_height(&mut self, height_m: f64) -> Action {
        self.update(TargetUpdate::height(height_m))
    }

    pub fn set_angle(&mut self, angle_rad: f64) -> Action {
        self.update(TargetUpdate::angle(angle_rad))
    }

    pub fn set_effector(&mut self, effector_v: f64) -> Action {
        self.update(TargetUpdate::effector(effector_v))
    }

    /// Drive to a preset, applying its effector bias if it has one.
    pub fn set_preset(&mut self, id: PresetId) -> Action {
        self.update(self.preset_update(id))
    }

    pub fn set_preset_with_effector(&mut self, id: PresetId, effector_v: f64) -> Action {
        self.update(self.preset_update(id).with_effector(effector_v))
    }

    /// The update which [`Coordinator::set_preset`] would apply.
    pub fn preset_update(&self, id: PresetId) -> TargetUpdate {
        let p = self.table.get(id);

        TargetUpdate {
            height_m: Some(p.height_m),
            angle_rad: Some(p.angle_rad),
            effector_v: p.effector_v,
        }
    }
}
