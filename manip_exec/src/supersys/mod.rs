//! # Supersystem module
//!
//! Coordinates the elevator, pivot and effector so that operator intents (intake, score at a
//! layer, extract algae, return to storage) become sequences of concurrent mechanism targets,
//! gated by sensor triggers and timeouts and interruptible at every cycle.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod bindings;
mod coordinator;
mod ops;
mod params;
mod seq;
mod state;
mod table;
mod triggers;
mod turtle;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use bindings::*;
pub use coordinator::*;
pub use ops::build;
pub use params::*;
pub use seq::*;
pub use state::*;
pub use table::*;
pub use triggers::*;
pub use turtle::drive_scale;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during supersystem initialisation and processing.
#[derive(Debug, thiserror::Error)]
pub enum SupersysError {
    #[error("Could not load the supersystem parameters: {0}")]
    LoadError(util::params::LoadError),

    #[error("Invalid supersystem parameters: {0}")]
    ParamsError(ParamsError),

    #[error("Could not open the supersystem archive: {0}")]
    ArchiveError(util::archive::ArchiveError),

    #[error("The supersystem has not been initialised")]
    NotInitialised,
}

// ------------------------------------------------------------------------------------------------
// TEST SUPPORT
// ------------------------------------------------------------------------------------------------

/// A complete and valid parameter set for unit tests.
#[cfg(test)]
pub(crate) fn test_params() -> SupersysParams {
    use comms_if::tc::supersys::{AlgaeLayer, CoralLayer, PresetId};

    let preset = |id, height_m, angle_rad| PresetEntry {
        id,
        height_m,
        angle_rad,
        effector_v: None,
    };
    let score = |height, angle, effector_v| ScorePolicy {
        height,
        angle,
        effector_v: Some(effector_v),
    };

    SupersysParams {
        limits: TravelLimits {
            min_height_m: 0.0,
            max_height_m: 1.35,
            min_angle_rad: -0.2,
            max_angle_rad: 0.6,
            min_effector_v: -12.0,
            max_effector_v: 12.0,
        },
        tolerances: Tolerances {
            height_m: 0.0254,
            angle_rad: 0.01745,
        },
        presets: vec![
            preset(PresetId::Stow, 0.0, 0.0),
            preset(PresetId::ScoreL1, 0.05, 0.25),
            preset(PresetId::ScoreL2, 0.30, 0.17),
            preset(PresetId::ScoreL3, 0.70, 0.17),
            preset(PresetId::ScoreL4, 1.30, 0.14),
            preset(PresetId::IntakeCatch, 0.45, 0.15),
            preset(PresetId::IntakeGrip, 0.35, 0.50),
            preset(PresetId::ExtractAlgaeLow, 0.55, 0.30),
            preset(PresetId::ExtractAlgaeHigh, 0.95, 0.30),
            preset(PresetId::AlgaeProcessor, 0.10, 0.30),
            preset(PresetId::AlgaeBarge, 1.30, 0.10),
            preset(PresetId::AlgaeStorage, 0.20, 0.25),
        ],
        coral_layers: vec![
            CoralLayerEntry {
                layer: CoralLayer::L1,
                preset: PresetId::ScoreL1,
                score: score(AxisSpec::Keep, AxisSpec::Keep, -3.0),
            },
            CoralLayerEntry {
                layer: CoralLayer::L2,
                preset: PresetId::ScoreL2,
                score: score(
                    AxisSpec::Preset(PresetId::ScoreL2),
                    AxisSpec::ReleaseFrom(PresetId::ScoreL2),
                    0.0,
                ),
            },
            CoralLayerEntry {
                layer: CoralLayer::L3,
                preset: PresetId::ScoreL3,
                score: score(
                    AxisSpec::Preset(PresetId::ScoreL3),
                    AxisSpec::ReleaseFrom(PresetId::ScoreL4),
                    0.0,
                ),
            },
            CoralLayerEntry {
                layer: CoralLayer::L4,
                preset: PresetId::ScoreL4,
                score: score(
                    AxisSpec::Preset(PresetId::ScoreL4),
                    AxisSpec::Value(0.0),
                    0.0,
                ),
            },
        ],
        algae_layers: vec![
            AlgaeLayerEntry {
                layer: AlgaeLayer::High,
                preset: PresetId::ExtractAlgaeLow,
            },
            AlgaeLayerEntry {
                layer: AlgaeLayer::Low,
                preset: PresetId::ExtractAlgaeHigh,
            },
        ],
        intake: IntakeParams {
            setup_angle_rad: 0.15,
            setup_clear_angle_rad: 0.0,
            load_effector_v: 2.0,
            load_timeout_s: 3.0,
            retain_effector_v: 1.0,
            post_clear_angle_rad: 0.1,
        },
        algae: AlgaeParams {
            extract_effector_v: -3.0,
            hold_effector_v: -1.0,
            eject_effector_v: 3.0,
            score_timeout_s: 2.0,
        },
        release_offset_rad: 0.0277,
        coral_prepare_timeout_s: 2.0,
        turtle: TurtleParams {
            threshold_preset: PresetId::ScoreL3,
            reduced_scale: 0.357,
        },
        bindings: Vec::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::supersys::{AlgaeLayer, CoralLayer, PresetId};

    #[test]
    fn test_tables_total() {
        let table = test_params().validate().unwrap();

        for id in PresetId::all() {
            let p = table.get(*id);
            assert!(p.height_m.is_finite() && p.angle_rad.is_finite());
        }

        let coral: Vec<_> = CoralLayer::all().iter().map(|l| table.coral_preset(*l)).collect();
        assert_eq!(coral[0], table.get(PresetId::ScoreL1));
        assert_eq!(coral[3], table.get(PresetId::ScoreL4));

        assert_eq!(
            table.algae_preset(AlgaeLayer::High),
            table.get(PresetId::ExtractAlgaeLow)
        );
        assert_eq!(
            table.algae_preset(AlgaeLayer::Low),
            table.get(PresetId::ExtractAlgaeHigh)
        );
    }

    #[test]
    fn test_missing_preset() {
        let mut params = test_params();
        params.presets.retain(|p| p.id != PresetId::IntakeGrip);

        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::MissingPreset(PresetId::IntakeGrip)
        );
    }

    #[test]
    fn test_duplicate_preset() {
        let mut params = test_params();
        let dup = params.presets[3];
        params.presets.push(dup);

        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::DuplicatePreset(PresetId::ScoreL3)
        );
    }

    #[test]
    fn test_out_of_travel_preset() {
        let mut params = test_params();
        params.presets[4].height_m = 2.0;

        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::PresetOutOfTravel(PresetId::ScoreL4, "elevator", 2.0)
        );
    }

    #[test]
    fn test_non_total_layer_maps() {
        let mut params = test_params();
        params.coral_layers.pop();
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::MissingCoralLayer(CoralLayer::L4)
        );

        let mut params = test_params();
        params.algae_layers[1].layer = AlgaeLayer::High;
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::DuplicateAlgaeLayer(AlgaeLayer::High)
        );
    }

    #[test]
    fn test_invalid_score_policy() {
        let mut params = test_params();
        params.coral_layers[1].score.height = AxisSpec::ReleaseFrom(PresetId::ScoreL2);
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidScorePolicy(CoralLayer::L2, _))
        ));

        let mut params = test_params();
        params.coral_layers[3].score.angle = AxisSpec::Value(1.0);
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidScorePolicy(CoralLayer::L4, _))
        ));
    }

    #[test]
    fn test_invalid_constants() {
        let mut params = test_params();
        params.turtle.reduced_scale = 0.0;
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::InvalidTurtleScale(0.0)
        );

        let mut params = test_params();
        params.intake.load_timeout_s = -1.0;
        assert_eq!(
            params.validate().unwrap_err(),
            ParamsError::InvalidConstant("intake.load_timeout_s", -1.0)
        );
    }
}
