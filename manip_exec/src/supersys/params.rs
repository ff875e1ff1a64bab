//! Parameters for the supersystem
//!
//! Everything tunable about the manipulator lives here: the travel limits, the preset table, the
//! layer maps, the score policies and the constants used by the sequences. The whole set is
//! validated once with [`SupersysParams::validate`], which produces the [`PresetTable`] used at
//! runtime.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::supersys::{AlgaeLayer, CoralLayer, PresetId};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

use super::bindings::Binding;
use super::table::{Preset, PresetTable};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the supersystem.
#[derive(Debug, Clone, Deserialize)]
pub struct SupersysParams {
    // ---- MECHANISMS ----
    /// Travel limits of the mechanisms, every preset must lie within them.
    pub limits: TravelLimits,

    /// Tolerances used by the "at target" triggers.
    pub tolerances: Tolerances,

    // ---- TABLES ----
    /// The preset table, must contain every [`PresetId`] exactly once.
    pub presets: Vec<PresetEntry>,

    /// Coral layer to preset map and score policy, must contain every [`CoralLayer`] exactly once.
    pub coral_layers: Vec<CoralLayerEntry>,

    /// Algae layer to preset map, must contain every [`AlgaeLayer`] exactly once.
    pub algae_layers: Vec<AlgaeLayerEntry>,

    // ---- SEQUENCES ----
    pub intake: IntakeParams,

    pub algae: AlgaeParams,

    /// How far below a preset's angle the arm is lowered to release a coral.
    ///
    /// Units: radians
    pub release_offset_rad: f64,

    /// Maximum time CoralPrepare waits for the elevator before moving the arm anyway.
    ///
    /// Units: seconds
    pub coral_prepare_timeout_s: f64,

    // ---- DRIVER ASSISTANCE ----
    pub turtle: TurtleParams,

    // ---- OPERATOR ----
    /// Button binding table
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Travel limits of the three mechanisms.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct TravelLimits {
    pub min_height_m: f64,
    pub max_height_m: f64,
    pub min_angle_rad: f64,
    pub max_angle_rad: f64,
    pub min_effector_v: f64,
    pub max_effector_v: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Tolerances {
    /// Units: meters
    pub height_m: f64,

    /// Units: radians
    pub angle_rad: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct PresetEntry {
    pub id: PresetId,
    pub height_m: f64,
    pub angle_rad: f64,

    /// Effector bias applied with the preset, if the preset has one.
    #[serde(default)]
    pub effector_v: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct CoralLayerEntry {
    pub layer: CoralLayer,
    pub preset: PresetId,
    pub score: ScorePolicy,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct AlgaeLayerEntry {
    pub layer: AlgaeLayer,
    pub preset: PresetId,
}

/// How a coral is released on a layer.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct ScorePolicy {
    pub height: AxisSpec,
    pub angle: AxisSpec,

    /// Effector bias to apply, `None` keeps the current one.
    #[serde(default)]
    pub effector_v: Option<f64>,
}

/// Where one axis goes when scoring.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AxisSpec {
    /// Leave the axis where it is
    Keep,

    /// The axis' value in the given preset
    Preset(PresetId),

    /// The given preset's angle less the release offset. Only valid for the angle axis.
    ReleaseFrom(PresetId),

    /// An explicit value
    Value(f64),
}

/// Which of the two positional axes an [`AxisSpec`] is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Height,
    Angle,
}

/// Constants of the intake sequences.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct IntakeParams {
    /// Angle the arm is raised to before the elevator moves
    pub setup_angle_rad: f64,

    /// The elevator moves once the arm is above this angle
    pub setup_clear_angle_rad: f64,

    /// Effector bias pulling the coral in
    pub load_effector_v: f64,

    /// Maximum time spent pulling the coral in
    pub load_timeout_s: f64,

    /// Effector bias holding a loaded coral
    pub retain_effector_v: f64,

    /// The elevator lowers to storage once the arm is above this angle
    pub post_clear_angle_rad: f64,
}

/// Constants of the algae sequences.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct AlgaeParams {
    /// Effector bias pulling algae off the reef
    pub extract_effector_v: f64,

    /// Effector bias holding algae
    pub hold_effector_v: f64,

    /// Effector bias throwing algae into the processor or barge
    pub eject_effector_v: f64,

    /// Maximum time spent reaching a scoring preset before ejecting anyway
    pub score_timeout_s: f64,
}

/// Drive speed limiting while the manipulator is raised.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct TurtleParams {
    /// Drive speed is reduced when the elevator is at or above this preset's height
    pub threshold_preset: PresetId,

    /// Drive speed scale applied while turtled
    pub reduced_scale: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors in the supersystem configuration. Any of these halts initialisation.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("Invalid {0} travel limits, the minimum must be below the maximum")]
    InvalidLimits(&'static str),

    #[error("Tolerances must be positive and finite")]
    InvalidTolerance,

    #[error("Preset {0:?} is missing from the preset table")]
    MissingPreset(PresetId),

    #[error("Preset {0:?} appears more than once in the preset table")]
    DuplicatePreset(PresetId),

    #[error("Preset {0:?} puts the {1} at {2}, outside of its travel")]
    PresetOutOfTravel(PresetId, &'static str, f64),

    #[error("Coral layer {0:?} has no preset")]
    MissingCoralLayer(CoralLayer),

    #[error("Coral layer {0:?} appears more than once")]
    DuplicateCoralLayer(CoralLayer),

    #[error("Algae layer {0:?} has no preset")]
    MissingAlgaeLayer(AlgaeLayer),

    #[error("Algae layer {0:?} appears more than once")]
    DuplicateAlgaeLayer(AlgaeLayer),

    #[error("The score policy of coral layer {0:?} is invalid: {1}")]
    InvalidScorePolicy(CoralLayer, &'static str),

    #[error("Sequence constant {0} is invalid: {1}")]
    InvalidConstant(&'static str, f64),

    #[error("Turtle scale must be in (0, 1], found {0}")]
    InvalidTurtleScale(f64),

    #[error("Button {0} has more than one {1:?} binding")]
    DuplicateBinding(u8, super::bindings::BindMode),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SupersysParams {
    /// Check the parameters and build the runtime lookup tables from them.
    pub fn validate(&self) -> Result<PresetTable, ParamsError> {
        self.limits.validate()?;

        let tol_ok = |t: f64| t.is_finite() && t > 0.0;
        if !tol_ok(self.tolerances.height_m) || !tol_ok(self.tolerances.angle_rad) {
            return Err(ParamsError::InvalidTolerance);
        }

        // ---- PRESETS ----

        let mut presets: [Option<Preset>; PresetId::COUNT] = [None; PresetId::COUNT];
        for entry in self.presets.iter() {
            if presets[entry.id.index()].is_some() {
                return Err(ParamsError::DuplicatePreset(entry.id));
            }

            self.limits.check(entry.id, "elevator", entry.height_m, Axis::Height)?;
            self.limits.check(entry.id, "pivot", entry.angle_rad, Axis::Angle)?;
            if let Some(v) = entry.effector_v {
                self.limits.check_effector(entry.id, v)?;
            }

            presets[entry.id.index()] = Some(Preset {
                height_m: entry.height_m,
                angle_rad: entry.angle_rad,
                effector_v: entry.effector_v,
            });
        }

        let mut table = PresetTable::default();
        for id in PresetId::all() {
            match presets[id.index()] {
                Some(p) => table.presets[id.index()] = p,
                None => return Err(ParamsError::MissingPreset(*id)),
            }
        }

        // ---- CORAL LAYERS ----

        let mut seen = HashSet::new();
        for entry in self.coral_layers.iter() {
            if !seen.insert(entry.layer) {
                return Err(ParamsError::DuplicateCoralLayer(entry.layer));
            }
            table.coral[entry.layer.index()] = entry.preset;
            table.score[entry.layer.index()] = entry.score;
        }
        for layer in CoralLayer::all() {
            if !seen.contains(layer) {
                return Err(ParamsError::MissingCoralLayer(*layer));
            }
        }

        // ---- ALGAE LAYERS ----

        let mut seen = HashSet::new();
        for entry in self.algae_layers.iter() {
            if !seen.insert(entry.layer) {
                return Err(ParamsError::DuplicateAlgaeLayer(entry.layer));
            }
            table.algae[entry.layer.index()] = entry.preset;
        }
        for layer in AlgaeLayer::all() {
            if !seen.contains(layer) {
                return Err(ParamsError::MissingAlgaeLayer(*layer));
            }
        }

        table.release_offset_rad = self.release_offset_rad;

        // ---- SCORE POLICIES ----

        // Policies are checked against the finished table so the resolved targets can be
        // checked against the travel limits too.
        for layer in CoralLayer::all() {
            let policy = table.score_policy(*layer);

            if let AxisSpec::ReleaseFrom(_) = policy.height {
                return Err(ParamsError::InvalidScorePolicy(
                    *layer,
                    "release_from only applies to the angle",
                ));
            }
            if let Some(h) = table.resolve(policy.height, Axis::Height) {
                if h < self.limits.min_height_m || h > self.limits.max_height_m {
                    return Err(ParamsError::InvalidScorePolicy(
                        *layer,
                        "height outside of the elevator's travel",
                    ));
                }
            }
            if let Some(a) = table.resolve(policy.angle, Axis::Angle) {
                if a < self.limits.min_angle_rad || a > self.limits.max_angle_rad {
                    return Err(ParamsError::InvalidScorePolicy(
                        *layer,
                        "angle outside of the pivot's travel",
                    ));
                }
            }
            if let Some(v) = policy.effector_v {
                if v < self.limits.min_effector_v || v > self.limits.max_effector_v {
                    return Err(ParamsError::InvalidScorePolicy(
                        *layer,
                        "effector bias outside of the effector's range",
                    ));
                }
            }
        }

        // ---- CONSTANTS ----

        let positive = [
            ("intake.load_timeout_s", self.intake.load_timeout_s),
            ("algae.score_timeout_s", self.algae.score_timeout_s),
            ("coral_prepare_timeout_s", self.coral_prepare_timeout_s),
        ];
        for (name, value) in positive.iter() {
            if !value.is_finite() || *value <= 0.0 {
                return Err(ParamsError::InvalidConstant(*name, *value));
            }
        }

        if !self.release_offset_rad.is_finite() {
            return Err(ParamsError::InvalidConstant(
                "release_offset_rad",
                self.release_offset_rad,
            ));
        }

        let scale = self.turtle.reduced_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(ParamsError::InvalidTurtleScale(scale));
        }

        // ---- BINDINGS ----

        let mut seen = HashSet::new();
        for binding in self.bindings.iter() {
            if !seen.insert((binding.button, binding.mode)) {
                return Err(ParamsError::DuplicateBinding(binding.button, binding.mode));
            }
        }

        Ok(table)
    }
}

impl TravelLimits {
    fn validate(&self) -> Result<(), ParamsError> {
        let pairs = [
            ("elevator", self.min_height_m, self.max_height_m),
            ("pivot", self.min_angle_rad, self.max_angle_rad),
            ("effector", self.min_effector_v, self.max_effector_v),
        ];

        for (name, min, max) in pairs.iter() {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(ParamsError::InvalidLimits(*name));
            }
        }

        Ok(())
    }

    fn check(
        &self,
        id: PresetId,
        name: &'static str,
        value: f64,
        axis: Axis,
    ) -> Result<(), ParamsError> {
        let (min, max) = match axis {
            Axis::Height => (self.min_height_m, self.max_height_m),
            Axis::Angle => (self.min_angle_rad, self.max_angle_rad),
        };

        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(ParamsError::PresetOutOfTravel(id, name, value))
        }
    }

    fn check_effector(&self, id: PresetId, value: f64) -> Result<(), ParamsError> {
        if value.is_finite() && value >= self.min_effector_v && value <= self.max_effector_v {
            Ok(())
        } else {
            Err(ParamsError::PresetOutOfTravel(id, "effector", value))
        }
    }
}
