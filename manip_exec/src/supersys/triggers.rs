//! Presence and position triggers
//!
//! Triggers are boolean conditions over the current [`TriggerCtx`], which is rebuilt from the live
//! sensor readings on every cycle. Level triggers are simply evaluated, edge triggers go through
//! an [`EdgeDetector`] owned by whoever is watching them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::{ActId, MechSensData};

use super::params::{SupersysParams, Tolerances};
use super::table::PresetTable;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Everything triggers are evaluated against in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerCtx {
    /// Measured elevator height
    pub height_m: f64,

    /// Measured pivot angle
    pub angle_rad: f64,

    /// Raw break-beam state
    pub beam_broken: bool,

    /// Presence, after the operator override has been applied
    pub has_object: bool,

    pub bottom_limit: bool,

    /// Elevator raised high enough (or the operator asked) for the drive to be slowed down
    pub turtle: bool,

    pub presence_override: bool,
    pub turtle_override: bool,

    tolerances: Tolerances,
    min_height_m: f64,
}

/// Detects the rising edge of a boolean signal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeDetector {
    prev: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A condition over the current cycle's readings.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// An object is held (honours the presence override)
    HasObject,

    /// The elevator is resting on its bottom limit switch
    BottomLimit,

    /// Elevator height within tolerance of the given height. A target at the bottom of travel is
    /// also reached when the bottom limit switch is pressed.
    HeightAtTarget(f64),

    /// Elevator at or above the given height, no tolerance
    HeightAtLeast(f64),

    /// Pivot strictly above the given angle
    AngleAbove(f64),

    /// Pivot angle within tolerance of the given angle
    AngleAtTarget(f64),

    Turtle,

    /// Every one of the triggers
    All(Vec<Trigger>),
}

/// The condition which ends a phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Until {
    /// Trigger is true
    Level(Trigger),

    /// Trigger goes from false to true. A trigger which is already true when the phase starts
    /// counts as rising.
    Rising(Trigger),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TriggerCtx {
    /// Build the context from the sensor readings and operator flags.
    pub fn new(
        sens: &MechSensData,
        presence_override: bool,
        turtle_override: bool,
        params: &SupersysParams,
        table: &PresetTable,
    ) -> Self {
        let height_m = sens.pos_of(ActId::Elevator);
        let threshold_m = table.get(params.turtle.threshold_preset).height_m;

        Self {
            height_m,
            angle_rad: sens.pos_of(ActId::Pivot),
            beam_broken: sens.beam_broken,
            has_object: sens.beam_broken && !presence_override,
            bottom_limit: sens.bottom_limit,
            turtle: height_m >= threshold_m || turtle_override,
            presence_override,
            turtle_override,
            tolerances: params.tolerances,
            min_height_m: params.limits.min_height_m,
        }
    }

    pub fn height_at_target(&self, height_m: f64) -> bool {
        (self.height_m - height_m).abs() <= self.tolerances.height_m
            || (height_m <= self.min_height_m + self.tolerances.height_m && self.bottom_limit)
    }

    pub fn angle_at_target(&self, angle_rad: f64) -> bool {
        (self.angle_rad - angle_rad).abs() <= self.tolerances.angle_rad
    }
}

impl Trigger {
    pub fn eval(&self, ctx: &TriggerCtx) -> bool {
        match self {
            Trigger::HasObject => ctx.has_object,
            Trigger::BottomLimit => ctx.bottom_limit,
            Trigger::HeightAtTarget(h) => ctx.height_at_target(*h),
            Trigger::HeightAtLeast(h) => ctx.height_m >= *h,
            Trigger::AngleAbove(a) => ctx.angle_rad > *a,
            Trigger::AngleAtTarget(a) => ctx.angle_at_target(*a),
            Trigger::Turtle => ctx.turtle,
            Trigger::All(ts) => ts.iter().all(|t| t.eval(ctx)),
        }
    }
}

impl EdgeDetector {
    /// Feed the current value, returns true on a rising edge.
    pub fn rising(&mut self, value: bool) -> bool {
        let rose = value && !self.prev;
        self.prev = value;
        rose
    }

    pub fn reset(&mut self) {
        self.prev = false;
    }
}

impl Until {
    /// Evaluate the condition, feeding `edge` if it is an edge condition.
    pub fn eval(&self, ctx: &TriggerCtx, edge: &mut EdgeDetector) -> bool {
        match self {
            Until::Level(t) => t.eval(ctx),
            Until::Rising(t) => edge.rising(t.eval(ctx)),
        }
    }
}
