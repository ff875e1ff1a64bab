//! Validated lookup tables
//!
//! A [`PresetTable`] can only be built by [`SupersysParams::validate`](super::SupersysParams),
//! which guarantees every preset and every layer has an entry. Lookups are plain array indexing
//! and cannot fail.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::supersys::{AlgaeLayer, CoralLayer, PresetId};
use serde::Serialize;

use super::params::{Axis, AxisSpec, ScorePolicy};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A named configuration of the manipulator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Preset {
    /// Units: meters
    pub height_m: f64,

    /// Units: radians
    pub angle_rad: f64,

    /// Units: volts
    pub effector_v: Option<f64>,
}

/// Total lookup tables over presets and layers.
#[derive(Debug, Clone)]
pub struct PresetTable {
    pub(super) presets: [Preset; PresetId::COUNT],
    pub(super) coral: [PresetId; CoralLayer::COUNT],
    pub(super) algae: [PresetId; AlgaeLayer::COUNT],
    pub(super) score: [ScorePolicy; CoralLayer::COUNT],
    pub(super) release_offset_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PresetTable {
    pub fn get(&self, id: PresetId) -> Preset {
        self.presets[id.index()]
    }

    /// The preset a coral layer is prepared and scored at.
    pub fn coral_preset(&self, layer: CoralLayer) -> Preset {
        self.get(self.coral[layer.index()])
    }

    /// The preset algae is extracted from at the given layer.
    pub fn algae_preset(&self, layer: AlgaeLayer) -> Preset {
        self.get(self.algae[layer.index()])
    }

    pub fn score_policy(&self, layer: CoralLayer) -> ScorePolicy {
        self.score[layer.index()]
    }

    /// Resolve an axis of a score policy into a target, `None` meaning the axis keeps its
    /// current target.
    pub fn resolve(&self, spec: AxisSpec, axis: Axis) -> Option<f64> {
        match (spec, axis) {
            (AxisSpec::Keep, _) => None,
            (AxisSpec::Preset(id), Axis::Height) => Some(self.get(id).height_m),
            (AxisSpec::Preset(id), Axis::Angle) => Some(self.get(id).angle_rad),
            (AxisSpec::ReleaseFrom(id), Axis::Angle) => {
                Some(self.get(id).angle_rad - self.release_offset_rad)
            }
            // Rejected at validation
            (AxisSpec::ReleaseFrom(_), Axis::Height) => None,
            (AxisSpec::Value(v), _) => Some(v),
        }
    }
}

impl Default for PresetTable {
    /// An all-zero table, only used as the placeholder of an uninitialised supersystem.
    fn default() -> Self {
        let keep = ScorePolicy {
            height: AxisSpec::Keep,
            angle: AxisSpec::Keep,
            effector_v: None,
        };

        Self {
            presets: [Preset::default(); PresetId::COUNT],
            coral: [PresetId::Stow; CoralLayer::COUNT],
            algae: [PresetId::Stow; AlgaeLayer::COUNT],
            score: [keep; CoralLayer::COUNT],
            release_offset_rad: 0.0,
        }
    }
}
