//! Drives the supersystem cycle by cycle through `State::proc` with synthetic sensor data, using
//! the parameters shipped in `params/supersys.toml`.

use comms_if::{
    eqpt::mech::{ActId, MechDems, MechSensData},
    tc::supersys::{CoralLayer, PresetId, SupersysCmd},
};
use manip_lib::{
    supersys::{ButtonEvent, InputData, StatusReport, SupersysCtrl, SupersysParams},
    CYCLE_PERIOD_S,
};
use util::module::State;

// ------------------------------------------------------------------------------------------------
// HELPERS
// ------------------------------------------------------------------------------------------------

fn params() -> SupersysParams {
    util::params::from_str(include_str!("../../params/supersys.toml")).unwrap()
}

/// A supersystem with a hand-driven "plant", where the sensors read whatever the test sets.
struct Rig {
    ctrl: SupersysCtrl,
    cycle: u64,
    sens: MechSensData,
}

impl Rig {
    fn new() -> Self {
        Self {
            ctrl: SupersysCtrl::new(params()).unwrap(),
            cycle: 0,
            sens: MechSensData::default(),
        }
    }

    fn time_s(&self) -> f64 {
        self.cycle as f64 * CYCLE_PERIOD_S
    }

    fn set_pos(&mut self, height_m: f64, angle_rad: f64) {
        self.sens.pos.insert(ActId::Elevator, height_m);
        self.sens.pos.insert(ActId::Pivot, angle_rad);
        self.sens.bottom_limit = height_m <= 0.005;
    }

    fn tick_with(&mut self, mut input: InputData) -> (MechDems, StatusReport) {
        input.time_s = self.time_s();
        input.sens = self.sens.clone();
        self.cycle += 1;
        self.ctrl.proc(&input).unwrap()
    }

    fn tick(&mut self) -> (MechDems, StatusReport) {
        self.tick_with(InputData::default())
    }

    fn cmd(&mut self, cmd: SupersysCmd) -> (MechDems, StatusReport) {
        self.tick_with(InputData {
            cmds: vec![cmd],
            ..Default::default()
        })
    }

    fn press(&mut self, id: u8) -> (MechDems, StatusReport) {
        self.tick_with(InputData {
            buttons: vec![
                ButtonEvent { id, pressed: true },
                ButtonEvent { id, pressed: false },
            ],
            ..Default::default()
        })
    }

    /// Move the sensors to the current demands, as a perfect plant would.
    fn follow(&mut self, dems: &MechDems) {
        self.set_pos(
            dems.get(ActId::Elevator).unwrap(),
            dems.get(ActId::Pivot).unwrap(),
        );
    }
}

fn target(dems: &MechDems) -> (f64, f64, f64) {
    (
        dems.get(ActId::Elevator).unwrap(),
        dems.get(ActId::Pivot).unwrap(),
        dems.get(ActId::Effector).unwrap(),
    )
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[test]
fn shipped_params_valid() {
    let params = params();
    let table = params.validate().unwrap();

    for layer in CoralLayer::all() {
        let p = table.coral_preset(*layer);
        assert!(p.height_m >= params.limits.min_height_m);
        assert!(p.height_m <= params.limits.max_height_m);
    }
    assert!(!params.bindings.is_empty());
}

#[test]
fn drive_action_emits_all_demands() {
    let mut rig = Rig::new();

    for cmd in [
        SupersysCmd::SetHeight { height_m: 0.5 },
        SupersysCmd::SetAngle { angle_rad: 0.2 },
        SupersysCmd::SetEffector { effector_v: 2.0 },
    ]
    .iter()
    {
        let (dems, _) = rig.cmd(*cmd);
        assert!(dems.is_valid());
    }

    let (dems, rpt) = rig.tick();
    assert_eq!(target(&dems), (0.5, 0.2, 2.0));
    assert_eq!(rpt.target_height_m, 0.5);
    assert_eq!(rpt.target_angle_rad, 0.2);
    assert_eq!(rpt.target_effector_v, 2.0);
}

#[test]
fn coral_score_l1_changes_effector_only() {
    let mut rig = Rig::new();

    let (before, _) = rig.cmd(SupersysCmd::CoralPrepareElevator {
        layer: CoralLayer::L1,
    });
    let (after, _) = rig.cmd(SupersysCmd::CoralScore {
        layer: CoralLayer::L1,
    });

    let (h0, a0, _) = target(&before);
    assert_eq!(target(&after), (h0, a0, -3.0));
}

#[test]
fn coral_score_l4_drops_arm_and_stops_effector() {
    let mut rig = Rig::new();
    let l4_m = params().validate().unwrap().get(PresetId::ScoreL4).height_m;

    rig.cmd(SupersysCmd::SetEffector { effector_v: 1.0 });
    rig.cmd(SupersysCmd::CoralPrepareArm {
        layer: CoralLayer::L4,
    });
    let (dems, _) = rig.cmd(SupersysCmd::CoralScore {
        layer: CoralLayer::L4,
    });

    assert_eq!(target(&dems), (l4_m, 0.0, 0.0));
}

#[test]
fn intake_setup_phases() {
    let mut rig = Rig::new();
    let table = params().validate().unwrap();
    let catch_m = table.get(PresetId::IntakeCatch).height_m;
    let grip_rad = table.get(PresetId::IntakeGrip).angle_rad;

    // Arm raises first, elevator waits
    let (dems, rpt) = rig.press(85);
    assert_eq!(rpt.active_op, Some("IntakeSetup"));
    assert_eq!(target(&dems), (0.0, 0.15, 0.0));

    for _ in 0..5 {
        let (_, rpt) = rig.tick();
        assert_eq!(rpt.phase, Some(0));
    }

    // Arm clears, elevator moves
    rig.set_pos(0.0, 0.05);
    rig.tick();
    let (dems, rpt) = rig.tick();
    assert_eq!(rpt.phase, Some(1));
    assert_eq!(target(&dems), (catch_m, 0.15, 0.0));

    // Elevator arrives, arm lowers to grip and holds
    rig.set_pos(catch_m, 0.15);
    rig.tick();
    for _ in 0..50 {
        let (dems, rpt) = rig.tick();
        assert_eq!(rpt.phase, Some(2));
        assert_eq!(target(&dems), (catch_m, grip_rad, 0.0));
    }
}

#[test]
fn intake_load_skipped_when_elevator_low() {
    let mut rig = Rig::new();

    let (before, _) = rig.cmd(SupersysCmd::SetHeight { height_m: 0.3 });
    rig.set_pos(0.3, 0.0);

    // The skipped operation still cancels the running one, the target is held
    let (after, rpt) = rig.press(75);
    assert!(rpt.skipped);
    assert_eq!(rpt.active_op, None);
    assert_eq!(after, before);

    let (after, rpt) = rig.tick();
    assert!(!rpt.skipped);
    assert_eq!(rpt.active_op, None);
    assert_eq!(after, before);
}

#[test]
fn intake_load_needs_full_catch_height() {
    let mut rig = Rig::new();
    let catch_m = params().validate().unwrap().get(PresetId::IntakeCatch).height_m;

    // Within the at-target tolerance, but still below the catch height
    rig.set_pos(catch_m - 0.01, 0.0);
    let (dems, rpt) = rig.press(75);
    assert!(rpt.skipped);
    assert_eq!(rpt.active_op, None);
    assert_eq!(target(&dems).2, 0.0);

    rig.set_pos(catch_m, 0.0);
    let (dems, rpt) = rig.press(75);
    assert!(!rpt.skipped);
    assert_eq!(rpt.active_op, Some("IntakeLoad"));
    assert_eq!(target(&dems).2, 2.0);
}

#[test]
fn skipped_operation_cancels_running_one() {
    let mut rig = Rig::new();

    let (before, rpt) = rig.press(85);
    assert_eq!(rpt.active_op, Some("IntakeSetup"));

    // Elevator still at the bottom, IntakeLoad is skipped
    let (after, rpt) = rig.press(75);
    assert!(rpt.skipped);
    assert_eq!(rpt.active_op, None);
    assert_eq!(after, before);

    // IntakeSetup doesn't come back once its condition is met
    rig.set_pos(0.0, 0.05);
    let (after, rpt) = rig.tick();
    assert_eq!(rpt.active_op, None);
    assert_eq!(after, before);
}

#[test]
fn intake_load_times_out() {
    let mut rig = Rig::new();
    let table = params().validate().unwrap();
    let catch = table.get(PresetId::IntakeCatch);
    let grip = table.get(PresetId::IntakeGrip);

    rig.set_pos(catch.height_m, catch.angle_rad);

    let (dems, rpt) = rig.press(75);
    assert_eq!(rpt.active_op, Some("IntakeLoad"));
    assert_eq!(target(&dems), (grip.height_m, grip.angle_rad, 2.0));

    // No coral ever arrives
    for _ in 0..145 {
        let (dems, rpt) = rig.tick();
        assert_eq!(rpt.phase, Some(0));
        assert_eq!(target(&dems).2, 2.0);
    }

    for _ in 0..10 {
        rig.tick();
    }
    let (dems, rpt) = rig.tick();
    assert_eq!(rpt.phase, Some(1));
    assert!(rpt.timed_out);
    assert_eq!(target(&dems), (catch.height_m, catch.angle_rad, 1.0));
}

#[test]
fn intake_load_completes_on_presence() {
    let mut rig = Rig::new();
    let catch = params().validate().unwrap().get(PresetId::IntakeCatch);

    rig.set_pos(catch.height_m, catch.angle_rad);
    rig.press(75);
    for _ in 0..10 {
        rig.tick();
    }

    rig.sens.beam_broken = true;
    let (_, rpt) = rig.tick();
    assert!(rpt.has_object);

    let (dems, rpt) = rig.tick();
    assert_eq!(rpt.phase, Some(1));
    assert!(!rpt.timed_out);
    assert_eq!(target(&dems).2, 1.0);
}

#[test]
fn presence_override_masks_beam() {
    let mut rig = Rig::new();
    let catch = params().validate().unwrap().get(PresetId::IntakeCatch);

    rig.set_pos(catch.height_m, catch.angle_rad);
    rig.sens.beam_broken = true;

    // Press and hold the override
    let (_, rpt) = rig.tick_with(InputData {
        buttons: vec![ButtonEvent { id: 70, pressed: true }],
        ..Default::default()
    });
    assert!(rpt.presence_override);
    assert!(rpt.beam_broken);
    assert!(!rpt.has_object);

    // The load doesn't see the coral
    rig.press(75);
    for _ in 0..20 {
        let (_, rpt) = rig.tick();
        assert_eq!(rpt.phase, Some(0));
    }

    let (_, rpt) = rig.tick_with(InputData {
        buttons: vec![ButtonEvent { id: 70, pressed: false }],
        ..Default::default()
    });
    assert!(!rpt.presence_override);
    assert!(rpt.has_object);
}

#[test]
fn turtle_boundaries() {
    let mut rig = Rig::new();
    let l3_m = params().validate().unwrap().get(PresetId::ScoreL3).height_m;

    rig.set_pos(l3_m - 0.001, 0.0);
    let (_, rpt) = rig.tick();
    assert!(!rpt.turtle);
    assert_eq!(rpt.drive_scale, 1.0);

    rig.set_pos(l3_m, 0.0);
    let (_, rpt) = rig.tick();
    assert!(rpt.turtle);
    assert_eq!(rpt.drive_scale, 0.357);

    rig.set_pos(0.0, 0.0);
    let (_, rpt) = rig.tick_with(InputData {
        turtle_override: Some(true),
        ..Default::default()
    });
    assert!(rpt.turtle);
    assert_eq!(rpt.drive_scale, 0.357);

    let (_, rpt) = rig.tick_with(InputData {
        turtle_override: Some(false),
        ..Default::default()
    });
    assert_eq!(rpt.drive_scale, 1.0);
}

#[test]
fn new_command_interrupts_sequence() {
    let mut rig = Rig::new();
    let table = params().validate().unwrap();
    let l3 = table.get(PresetId::ScoreL3);

    // Elevator never arrives, so CoralPrepare waits on its first phase
    let (dems, rpt) = rig.press(83);
    assert_eq!(rpt.active_op, Some("CoralPrepare"));
    assert_eq!(target(&dems).0, l3.height_m);

    let (dems, rpt) = rig.cmd(SupersysCmd::Storage);
    assert_eq!(rpt.active_op, Some("Storage"));
    assert_eq!(rpt.phase, Some(0));
    assert_eq!(target(&dems).0, table.get(PresetId::IntakeCatch).height_m);

    // Follow the targets and storage completes to its hold
    for _ in 0..5 {
        let (dems, _) = rig.tick();
        rig.follow(&dems);
    }
    let (dems, rpt) = rig.tick();
    assert_eq!(rpt.phase, Some(1));
    assert_eq!(
        target(&dems),
        (
            table.get(PresetId::ScoreL1).height_m,
            table.get(PresetId::ScoreL4).angle_rad,
            0.0
        )
    );
}

#[test]
fn coral_prepare_moves_arm_after_elevator() {
    let mut rig = Rig::new();
    let l2 = params().validate().unwrap().get(PresetId::ScoreL2);

    let (dems, _) = rig.cmd(SupersysCmd::CoralPrepare {
        layer: CoralLayer::L2,
    });
    assert_eq!(target(&dems), (l2.height_m, 0.0, 0.0));

    rig.follow(&dems);
    rig.tick();
    let (dems, rpt) = rig.tick();
    assert_eq!(rpt.phase, Some(1));
    assert_eq!(target(&dems), (l2.height_m, l2.angle_rad, 0.0));
}
