//! # Supersystem telecommands
//!
//! Named configurations and the high level intents that the manipulator supersystem can be
//! asked to perform.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifier of a named preset configuration (height, angle, optional effector bias).
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum PresetId {
    Stow,
    ScoreL1,
    ScoreL2,
    ScoreL3,
    ScoreL4,
    IntakeCatch,
    IntakeGrip,
    ExtractAlgaeLow,
    ExtractAlgaeHigh,
    AlgaeProcessor,
    AlgaeBarge,
    AlgaeStorage,
}

/// Reef layer a coral can be scored on.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum CoralLayer {
    L1,
    L2,
    L3,
    L4,
}

/// Reef level algae can be extracted from.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum AlgaeLayer {
    High,
    Low,
}

/// A command for the manipulator supersystem.
///
/// Every command is scheduled as an operation which replaces whatever operation the supersystem
/// was running before it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "op")]
pub enum SupersysCmd {
    /// Drive to an explicit state. If no effector bias is given the last one is kept.
    SetState {
        height_m: f64,
        angle_rad: f64,
        effector_v: Option<f64>,
    },

    /// Drive the elevator only.
    SetHeight { height_m: f64 },

    /// Drive the pivot only.
    SetAngle { angle_rad: f64 },

    /// Drive the effector only.
    SetEffector { effector_v: f64 },

    /// Drive to a preset. If no effector bias is given the preset's own bias is used, or the
    /// last one is kept if the preset doesn't define one.
    SetPreset {
        preset: PresetId,
        effector_v: Option<f64>,
    },

    /// Move into position to catch a coral from the intake.
    IntakeSetup,

    /// Grip a coral waiting in the intake.
    IntakeLoad,

    /// Bring a gripped coral up out of the intake and into storage.
    IntakePost,

    /// Return to the storage position.
    Storage,

    /// Storage position while holding algae.
    StorageAlgae,

    /// Move both elevator and arm to the given layer, elevator first.
    CoralPrepare { layer: CoralLayer },

    CoralPrepareElevator { layer: CoralLayer },

    CoralPrepareArm { layer: CoralLayer },

    /// Release the coral on the given layer.
    CoralScore { layer: CoralLayer },

    AlgaePrepareElevator { layer: AlgaeLayer },

    AlgaePrepareArm { layer: AlgaeLayer },

    /// Spin the effector to pull algae off the reef.
    AlgaeExtract,

    AlgaePrepareProcessor,

    AlgaeScoreProcessor,

    AlgaePrepareBarge,

    AlgaeScoreBarge,

    /// Stop the effector.
    ExtractionStop,
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

const PRESET_IDS: [PresetId; PresetId::COUNT] = [
    PresetId::Stow,
    PresetId::ScoreL1,
    PresetId::ScoreL2,
    PresetId::ScoreL3,
    PresetId::ScoreL4,
    PresetId::IntakeCatch,
    PresetId::IntakeGrip,
    PresetId::ExtractAlgaeLow,
    PresetId::ExtractAlgaeHigh,
    PresetId::AlgaeProcessor,
    PresetId::AlgaeBarge,
    PresetId::AlgaeStorage,
];

const CORAL_LAYERS: [CoralLayer; CoralLayer::COUNT] = [CoralLayer::L1, CoralLayer::L2, CoralLayer::L3, CoralLayer::L4];

const ALGAE_LAYERS: [AlgaeLayer; AlgaeLayer::COUNT] = [AlgaeLayer::High, AlgaeLayer::Low];

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PresetId {
    /// Number of presets.
    pub const COUNT: usize = 12;

    /// Every preset, ordered by [`PresetId::index`].
    pub fn all() -> &'static [PresetId] {
        &PRESET_IDS
    }

    /// Dense index of the preset, usable to index tables of length [`PresetId::COUNT`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl CoralLayer {
    pub const COUNT: usize = 4;

    pub fn all() -> &'static [CoralLayer] {
        &CORAL_LAYERS
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl AlgaeLayer {
    pub const COUNT: usize = 2;

    pub fn all() -> &'static [AlgaeLayer] {
        &ALGAE_LAYERS
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl SupersysCmd {
    /// Short name of the operation this command schedules, used in logs and telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            SupersysCmd::SetState { .. } => "SetState",
            SupersysCmd::SetHeight { .. } => "SetHeight",
            SupersysCmd::SetAngle { .. } => "SetAngle",
            SupersysCmd::SetEffector { .. } => "SetEffector",
            SupersysCmd::SetPreset { .. } => "SetPreset",
            SupersysCmd::IntakeSetup => "IntakeSetup",
            SupersysCmd::IntakeLoad => "IntakeLoad",
            SupersysCmd::IntakePost => "IntakePost",
            SupersysCmd::Storage => "Storage",
            SupersysCmd::StorageAlgae => "StorageAlgae",
            SupersysCmd::CoralPrepare { .. } => "CoralPrepare",
            SupersysCmd::CoralPrepareElevator { .. } => "CoralPrepareElevator",
            SupersysCmd::CoralPrepareArm { .. } => "CoralPrepareArm",
            SupersysCmd::CoralScore { .. } => "CoralScore",
            SupersysCmd::AlgaePrepareElevator { .. } => "AlgaePrepareElevator",
            SupersysCmd::AlgaePrepareArm { .. } => "AlgaePrepareArm",
            SupersysCmd::AlgaeExtract => "AlgaeExtract",
            SupersysCmd::AlgaePrepareProcessor => "AlgaePrepareProcessor",
            SupersysCmd::AlgaeScoreProcessor => "AlgaeScoreProcessor",
            SupersysCmd::AlgaePrepareBarge => "AlgaePrepareBarge",
            SupersysCmd::AlgaeScoreBarge => "AlgaeScoreBarge",
            SupersysCmd::ExtractionStop => "ExtractionStop",
        }
    }
}

impl Display for SupersysCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupersysCmd::CoralPrepare { layer }
            | SupersysCmd::CoralPrepareElevator { layer }
            | SupersysCmd::CoralPrepareArm { layer }
            | SupersysCmd::CoralScore { layer } => write!(f, "{}({:?})", self.name(), layer),
            SupersysCmd::AlgaePrepareElevator { layer }
            | SupersysCmd::AlgaePrepareArm { layer } => write!(f, "{}({:?})", self.name(), layer),
            SupersysCmd::SetPreset { preset, .. } => write!(f, "{}({:?})", self.name(), preset),
            _ => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, id) in PresetId::all().iter().enumerate() {
            assert_eq!(id.index(), i);
        }
        for (i, layer) in CoralLayer::all().iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
        for (i, layer) in AlgaeLayer::all().iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
    }

    #[test]
    fn test_set_state_effector_optional() {
        let cmd: SupersysCmd =
            serde_json::from_str(r#"{"op": "SetState", "height_m": 0.5, "angle_rad": 0.1}"#)
                .unwrap();

        assert_eq!(
            cmd,
            SupersysCmd::SetState {
                height_m: 0.5,
                angle_rad: 0.1,
                effector_v: None
            }
        );
        assert_eq!(format!("{}", cmd), "SetState");
    }
}
