//! Implementations for the SupersysCtrl state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{
    build, drive_scale, BindingEvent, Bindings, ButtonEvent, Coordinator, PresetTable, SeqExec,
    SupersysError, SupersysParams, TriggerCtx,
};
use comms_if::{
    eqpt::mech::{MechDems, MechSensData},
    tc::supersys::SupersysCmd,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Supersystem control module state
pub struct SupersysCtrl {
    params: Option<SupersysParams>,

    coord: Coordinator,

    bindings: Bindings,

    active: Option<ActiveOp>,

    presence_override: bool,

    turtle_override: bool,

    report: StatusReport,

    arch: Archiver,
}

/// The operation currently being run.
struct ActiveOp {
    exec: SeqExec,

    /// Binding the operation was started from, `None` for direct commands
    origin: Option<usize>,
}

/// Input data to the supersystem.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Session time of this cycle
    pub time_s: f64,

    /// This cycle's sensor readings
    pub sens: MechSensData,

    /// Button changes since the last cycle, in the order they happened
    pub buttons: Vec<ButtonEvent>,

    /// Commands to schedule directly, in order. The last one wins.
    pub cmds: Vec<SupersysCmd>,

    /// New value of the presence override, if it changed
    pub presence_override: Option<bool>,

    /// New value of the manual turtle flag, if it changed
    pub turtle_override: Option<bool>,
}

/// Status report for supersystem processing.
///
/// Flat so it can be archived as one CSV row per cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub time_s: f64,

    // ---- TARGET ----
    pub target_height_m: f64,
    pub target_angle_rad: f64,
    pub target_effector_v: f64,

    // ---- MEASURED ----
    pub height_m: f64,
    pub angle_rad: f64,

    // ---- TRIGGERS ----
    pub beam_broken: bool,
    pub has_object: bool,
    pub presence_override: bool,
    pub bottom_limit: bool,
    pub height_at_target: bool,
    pub angle_at_target: bool,
    pub turtle: bool,
    pub turtle_override: bool,
    pub drive_scale: f64,

    // ---- SEQUENCING ----
    /// Name of the operation running at the end of the cycle
    pub active_op: Option<&'static str>,

    /// Phase of the active operation
    pub phase: Option<usize>,

    /// The active operation has had a phase time out
    pub timed_out: bool,

    /// An operation was skipped this cycle because of its entry guard
    pub skipped: bool,

    /// An operation finished this cycle
    pub finished: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for SupersysCtrl {
    /// An uninitialised supersystem, which must be initialised with [`State::init`] before use.
    fn default() -> Self {
        Self {
            params: None,
            coord: Coordinator::new(PresetTable::default()),
            bindings: Bindings::default(),
            active: None,
            presence_override: false,
            turtle_override: false,
            report: StatusReport::default(),
            arch: Archiver::default(),
        }
    }
}

impl State for SupersysCtrl {
    type InitData = &'static str;
    type InitError = SupersysError;

    type InputData = InputData;
    type OutputData = MechDems;
    type StatusReport = StatusReport;
    type ProcError = SupersysError;

    /// Initialise the supersystem.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: SupersysParams = params::load(init_data).map_err(SupersysError::LoadError)?;

        *self = Self::new(params)?;

        self.arch = Archiver::from_path(session, "supersys.csv")
            .map_err(SupersysError::ArchiveError)?;

        Ok(())
    }

    /// Perform cyclic processing of the supersystem.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let params = match self.params {
            Some(ref p) => p,
            None => return Err(SupersysError::NotInitialised),
        };

        self.report = StatusReport::default();

        // ---- OPERATOR INPUT ----

        if let Some(active) = input_data.presence_override {
            set_flag(&mut self.presence_override, active, "Presence override");
        }
        if let Some(active) = input_data.turtle_override {
            set_flag(&mut self.turtle_override, active, "Turtle override");
        }

        let events = self.bindings.process(&input_data.buttons);

        // Flags are applied before any operation is scheduled so guards see them
        for event in events.iter() {
            match *event {
                BindingEvent::SetPresenceOverride(active) => {
                    set_flag(&mut self.presence_override, active, "Presence override")
                }
                BindingEvent::SetTurtleOverride(active) => {
                    set_flag(&mut self.turtle_override, active, "Turtle override")
                }
                _ => (),
            }
        }

        let ctx = TriggerCtx::new(
            &input_data.sens,
            self.presence_override,
            self.turtle_override,
            params,
            self.coord.presets(),
        );

        // ---- SCHEDULING ----

        for event in events.iter() {
            match *event {
                BindingEvent::Start { binding, cmd } => schedule(
                    &mut self.active,
                    &mut self.report,
                    &self.coord,
                    params,
                    &ctx,
                    cmd,
                    Some(binding),
                ),
                BindingEvent::Cancel { binding } => {
                    if self.active.as_ref().and_then(|a| a.origin) == Some(binding) {
                        if let Some(op) = self.active.take() {
                            info!("{} cancelled on release", op.exec.name());
                        }
                    }
                }
                _ => (),
            }
        }

        for cmd in input_data.cmds.iter() {
            schedule(
                &mut self.active,
                &mut self.report,
                &self.coord,
                params,
                &ctx,
                *cmd,
                None,
            );
        }

        // ---- SEQUENCING ----

        let action = match self.active {
            Some(ref mut op) => op.exec.step(&mut self.coord, &ctx, input_data.time_s),
            None => None,
        };

        if let Some(ref op) = self.active {
            if op.exec.is_finished() {
                debug!("{} complete", op.exec.name());
                self.report.finished = true;
                self.report.timed_out = op.exec.timed_out();
                self.active = None;
            }
        }

        // With no action the last target is held
        let target = match action {
            Some(a) => a.target,
            None => self.coord.target(),
        };
        let dems = target.dems();

        trace!("Supersys dems: {:?}", target);

        // ---- REPORT ----

        let r = &mut self.report;
        r.time_s = input_data.time_s;
        r.target_height_m = target.height_m;
        r.target_angle_rad = target.angle_rad;
        r.target_effector_v = target.effector_v;
        r.height_m = ctx.height_m;
        r.angle_rad = ctx.angle_rad;
        r.beam_broken = ctx.beam_broken;
        r.has_object = ctx.has_object;
        r.presence_override = ctx.presence_override;
        r.bottom_limit = ctx.bottom_limit;
        r.height_at_target = ctx.height_at_target(target.height_m);
        r.angle_at_target = ctx.angle_at_target(target.angle_rad);
        r.turtle = ctx.turtle;
        r.turtle_override = ctx.turtle_override;
        r.drive_scale = drive_scale(&ctx, &params.turtle);
        if let Some(ref op) = self.active {
            r.active_op = Some(op.exec.name());
            r.phase = Some(op.exec.phase());
            r.timed_out = op.exec.timed_out();
        }

        Ok((dems, self.report))
    }
}

impl SupersysCtrl {
    /// Create a new supersystem from its parameters, without archiving.
    pub fn new(params: SupersysParams) -> Result<Self, SupersysError> {
        let table = params.validate().map_err(SupersysError::ParamsError)?;

        info!(
            "Supersystem tables validated: {} presets, {} bindings",
            params.presets.len(),
            params.bindings.len()
        );

        Ok(Self {
            coord: Coordinator::new(table),
            bindings: Bindings::new(params.bindings.clone()),
            params: Some(params),
            ..Default::default()
        })
    }

    /// Function called when entering safe mode.
    ///
    /// Cancels the active operation and stops the effector, the elevator and pivot hold their
    /// last target.
    pub fn make_safe(&mut self) {
        if let Some(op) = self.active.take() {
            info!("{} cancelled by safe mode", op.exec.name());
        }

        self.coord.set_effector(0.0);
    }

    /// The coordinator, for read-only access to the target and presets.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coord
    }

    /// Name of the active operation, if any.
    pub fn active_op(&self) -> Option<&'static str> {
        self.active.as_ref().map(|a| a.exec.name())
    }

    pub fn presence_override(&self) -> bool {
        self.presence_override
    }

    pub fn turtle_override(&self) -> bool {
        self.turtle_override
    }
}

impl Archived for SupersysCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch.serialise(self.report)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn set_flag(flag: &mut bool, value: bool, name: &str) {
    if *flag != value {
        info!("{} {}", name, if value { "set" } else { "cleared" });
        *flag = value;
    }
}

/// Replace the active operation with a new one.
///
/// If the new operation's guards are false it is skipped, but the previous operation is still
/// cancelled and the target is held.
fn schedule(
    active: &mut Option<ActiveOp>,
    report: &mut StatusReport,
    coord: &Coordinator,
    params: &SupersysParams,
    ctx: &TriggerCtx,
    cmd: SupersysCmd,
    origin: Option<usize>,
) {
    let seq = build(&cmd, coord.presets(), params);

    match SeqExec::start(seq, ctx) {
        Some(exec) => {
            match active {
                Some(prev) => info!("{} replaces {}", cmd, prev.exec.name()),
                None => info!("{} started", cmd),
            }
            *active = Some(ActiveOp { exec, origin });
        }
        None => {
            match active.take() {
                Some(prev) => info!(
                    "{} skipped, entry guard not met, {} cancelled",
                    cmd,
                    prev.exec.name()
                ),
                None => info!("{} skipped, entry guard not met", cmd),
            }
            report.skipped = true;
        }
    }
}
