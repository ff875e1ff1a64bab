//! Sequencing operations
//!
//! Builds the phase list of every supersystem command. All values come from the validated preset
//! table and the sequence constants, so building an operation cannot fail.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::supersys::{CoralLayer, PresetId, SupersysCmd};

use super::coordinator::TargetUpdate;
use super::params::{Axis, SupersysParams};
use super::seq::{Phase, Sequence};
use super::table::PresetTable;
use super::triggers::{Trigger, Until};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the sequence a command schedules.
pub fn build(cmd: &SupersysCmd, table: &PresetTable, params: &SupersysParams) -> Sequence {
    let phases = match *cmd {
        SupersysCmd::SetState {
            height_m,
            angle_rad,
            effector_v,
        } => {
            let mut drive = TargetUpdate::position(height_m, angle_rad);
            drive.effector_v = effector_v;
            vec![Phase::terminal(drive)]
        }
        SupersysCmd::SetHeight { height_m } => vec![Phase::terminal(TargetUpdate::height(height_m))],
        SupersysCmd::SetAngle { angle_rad } => vec![Phase::terminal(TargetUpdate::angle(angle_rad))],
        SupersysCmd::SetEffector { effector_v } => {
            vec![Phase::terminal(TargetUpdate::effector(effector_v))]
        }
        SupersysCmd::SetPreset { preset, effector_v } => {
            let mut drive = preset_drive(table, preset);
            if effector_v.is_some() {
                drive.effector_v = effector_v;
            }
            vec![Phase::terminal(drive)]
        }

        // ---- INTAKE ----
        SupersysCmd::IntakeSetup => intake_setup(table, params),
        SupersysCmd::IntakeLoad => intake_load(table, params),
        SupersysCmd::IntakePost | SupersysCmd::Storage => intake_post(table, params),
        SupersysCmd::StorageAlgae => vec![Phase::terminal(
            preset_drive(table, PresetId::AlgaeStorage).with_effector(params.algae.hold_effector_v),
        )],

        // ---- CORAL ----
        SupersysCmd::CoralPrepare { layer } => coral_prepare(table, params, layer),
        SupersysCmd::CoralPrepareElevator { layer } => vec![Phase::terminal(TargetUpdate::height(
            table.coral_preset(layer).height_m,
        ))],
        SupersysCmd::CoralPrepareArm { layer } => vec![Phase::terminal(TargetUpdate::angle(
            table.coral_preset(layer).angle_rad,
        ))],
        SupersysCmd::CoralScore { layer } => coral_score(table, layer),

        // ---- ALGAE ----
        SupersysCmd::AlgaePrepareElevator { layer } => vec![Phase::terminal(TargetUpdate::height(
            table.algae_preset(layer).height_m,
        ))],
        SupersysCmd::AlgaePrepareArm { layer } => vec![Phase::terminal(TargetUpdate::angle(
            table.algae_preset(layer).angle_rad,
        ))],
        SupersysCmd::AlgaeExtract => vec![Phase::terminal(TargetUpdate::effector(
            params.algae.extract_effector_v,
        ))],
        SupersysCmd::AlgaePrepareProcessor => vec![Phase::terminal(
            preset_drive(table, PresetId::AlgaeProcessor).with_effector(params.algae.hold_effector_v),
        )],
        SupersysCmd::AlgaeScoreProcessor => algae_score(table, params, PresetId::AlgaeProcessor),
        SupersysCmd::AlgaePrepareBarge => vec![Phase::terminal(
            preset_drive(table, PresetId::AlgaeBarge).with_effector(params.algae.hold_effector_v),
        )],
        SupersysCmd::AlgaeScoreBarge => algae_score(table, params, PresetId::AlgaeBarge),
        SupersysCmd::ExtractionStop => vec![Phase::terminal(TargetUpdate::effector(0.0))],
    };

    Sequence {
        name: cmd.name(),
        phases,
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Drive to a preset, with the preset's own effector bias if it has one.
fn preset_drive(table: &PresetTable, id: PresetId) -> TargetUpdate {
    let p = table.get(id);

    TargetUpdate {
        height_m: Some(p.height_m),
        angle_rad: Some(p.angle_rad),
        effector_v: p.effector_v,
    }
}

/// Raise the arm clear of the intake, bring the elevator to the catch height, then lower the arm
/// to grip.
fn intake_setup(table: &PresetTable, params: &SupersysParams) -> Vec<Phase> {
    let catch_m = table.get(PresetId::IntakeCatch).height_m;

    vec![
        Phase {
            drive: TargetUpdate::angle(params.intake.setup_angle_rad),
            until: Some(Until::Level(Trigger::AngleAbove(
                params.intake.setup_clear_angle_rad,
            ))),
            timeout_s: None,
            guard: None,
        },
        Phase {
            drive: TargetUpdate::height(catch_m),
            until: Some(Until::Level(Trigger::HeightAtTarget(catch_m))),
            timeout_s: None,
            guard: None,
        },
        Phase::terminal(TargetUpdate::angle(table.get(PresetId::IntakeGrip).angle_rad)),
    ]
}

/// Pull the coral in until the beam breaks, then lift it back to the catch position. Only runs if
/// the elevator is already up at the catch height.
fn intake_load(table: &PresetTable, params: &SupersysParams) -> Vec<Phase> {
    let catch_m = table.get(PresetId::IntakeCatch).height_m;

    vec![
        Phase {
            drive: preset_drive(table, PresetId::IntakeGrip)
                .with_effector(params.intake.load_effector_v),
            until: Some(Until::Rising(Trigger::HasObject)),
            timeout_s: Some(params.intake.load_timeout_s),
            guard: None,
        },
        Phase {
            drive: preset_drive(table, PresetId::IntakeCatch)
                .with_effector(params.intake.retain_effector_v),
            until: None,
            timeout_s: None,
            guard: Some(Trigger::HeightAtLeast(catch_m)),
        },
    ]
}

/// Swing the arm over at the catch height, then drop the elevator to storage.
fn intake_post(table: &PresetTable, params: &SupersysParams) -> Vec<Phase> {
    let catch_m = table.get(PresetId::IntakeCatch).height_m;
    let l4_rad = table.get(PresetId::ScoreL4).angle_rad;

    vec![
        Phase {
            drive: TargetUpdate::position(catch_m, l4_rad),
            until: Some(Until::Level(Trigger::All(vec![
                Trigger::HeightAtTarget(catch_m),
                Trigger::AngleAbove(params.intake.post_clear_angle_rad),
            ]))),
            timeout_s: None,
            guard: None,
        },
        Phase::terminal(TargetUpdate::position(
            table.get(PresetId::ScoreL1).height_m,
            l4_rad,
        )),
    ]
}

fn coral_prepare(table: &PresetTable, params: &SupersysParams, layer: CoralLayer) -> Vec<Phase> {
    let p = table.coral_preset(layer);

    vec![
        Phase {
            drive: TargetUpdate::height(p.height_m),
            until: Some(Until::Level(Trigger::HeightAtTarget(p.height_m))),
            timeout_s: Some(params.coral_prepare_timeout_s),
            guard: None,
        },
        Phase::terminal(TargetUpdate::angle(p.angle_rad)),
    ]
}

fn coral_score(table: &PresetTable, layer: CoralLayer) -> Vec<Phase> {
    let policy = table.score_policy(layer);

    vec![Phase::terminal(TargetUpdate {
        height_m: table.resolve(policy.height, Axis::Height),
        angle_rad: table.resolve(policy.angle, Axis::Angle),
        effector_v: policy.effector_v,
    })]
}

/// Carry the algae to the scoring preset, then throw it.
fn algae_score(table: &PresetTable, params: &SupersysParams, id: PresetId) -> Vec<Phase> {
    let p = table.get(id);

    vec![
        Phase {
            drive: preset_drive(table, id).with_effector(params.algae.hold_effector_v),
            until: Some(Until::Level(Trigger::All(vec![
                Trigger::HeightAtTarget(p.height_m),
                Trigger::AngleAtTarget(p.angle_rad),
            ]))),
            timeout_s: Some(params.algae.score_timeout_s),
            guard: None,
        },
        Phase::terminal(TargetUpdate::effector(params.algae.eject_effector_v)),
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::supersys::test_params;
    use comms_if::tc::supersys::AlgaeLayer;

    #[test]
    fn test_every_command_builds() {
        let params = test_params();
        let table = params.validate().unwrap();

        let mut cmds = vec![
            SupersysCmd::SetState {
                height_m: 0.1,
                angle_rad: 0.1,
                effector_v: None,
            },
            SupersysCmd::SetHeight { height_m: 0.2 },
            SupersysCmd::SetAngle { angle_rad: 0.2 },
            SupersysCmd::SetEffector { effector_v: 1.0 },
            SupersysCmd::IntakeSetup,
            SupersysCmd::IntakeLoad,
            SupersysCmd::IntakePost,
            SupersysCmd::Storage,
            SupersysCmd::StorageAlgae,
            SupersysCmd::AlgaeExtract,
            SupersysCmd::AlgaePrepareProcessor,
            SupersysCmd::AlgaeScoreProcessor,
            SupersysCmd::AlgaePrepareBarge,
            SupersysCmd::AlgaeScoreBarge,
            SupersysCmd::ExtractionStop,
        ];
        for preset in PresetId::all() {
            cmds.push(SupersysCmd::SetPreset {
                preset: *preset,
                effector_v: None,
            });
        }
        for layer in CoralLayer::all() {
            cmds.push(SupersysCmd::CoralPrepare { layer: *layer });
            cmds.push(SupersysCmd::CoralPrepareElevator { layer: *layer });
            cmds.push(SupersysCmd::CoralPrepareArm { layer: *layer });
            cmds.push(SupersysCmd::CoralScore { layer: *layer });
        }
        for layer in AlgaeLayer::all() {
            cmds.push(SupersysCmd::AlgaePrepareElevator { layer: *layer });
            cmds.push(SupersysCmd::AlgaePrepareArm { layer: *layer });
        }

        for cmd in cmds.iter() {
            let seq = build(cmd, &table, &params);
            assert_eq!(seq.name, cmd.name());
            assert!(!seq.phases.is_empty());

            // Every operation ends holding its final target
            let last = &seq.phases[seq.phases.len() - 1];
            assert!(last.is_terminal(), "{} does not end in a hold", cmd);
        }
    }

    #[test]
    fn test_coral_score_policies() {
        let params = test_params();
        let table = params.validate().unwrap();
        let offset = params.release_offset_rad;

        let drive = |layer| build(&SupersysCmd::CoralScore { layer }, &table, &params).phases[0].drive;

        assert_eq!(drive(CoralLayer::L1), TargetUpdate::effector(-3.0));

        let l2 = table.get(PresetId::ScoreL2);
        assert_eq!(
            drive(CoralLayer::L2),
            TargetUpdate::state(l2.height_m, l2.angle_rad - offset, 0.0)
        );

        // L3 releases at the L4 angle
        let l3 = table.get(PresetId::ScoreL3);
        let l4 = table.get(PresetId::ScoreL4);
        assert_eq!(
            drive(CoralLayer::L3),
            TargetUpdate::state(l3.height_m, l4.angle_rad - offset, 0.0)
        );

        assert_eq!(
            drive(CoralLayer::L4),
            TargetUpdate::state(l4.height_m, 0.0, 0.0)
        );
    }

    #[test]
    fn test_algae_layers() {
        let params = test_params();
        let table = params.validate().unwrap();

        let high = build(
            &SupersysCmd::AlgaePrepareElevator {
                layer: AlgaeLayer::High,
            },
            &table,
            &params,
        );
        assert_eq!(
            high.phases[0].drive,
            TargetUpdate::height(table.get(PresetId::ExtractAlgaeLow).height_m)
        );

        let low = build(
            &SupersysCmd::AlgaePrepareArm {
                layer: AlgaeLayer::Low,
            },
            &table,
            &params,
        );
        assert_eq!(
            low.phases[0].drive,
            TargetUpdate::angle(table.get(PresetId::ExtractAlgaeHigh).angle_rad)
        );
    }
}
