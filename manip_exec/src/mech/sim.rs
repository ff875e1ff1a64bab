//! Simulated mechanisms
//!
//! A rate-limited first order model of each axis plus a break-beam and bottom limit switch model,
//! so the whole control loop can run headless.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::{ActId, MechDems, MechDemsResponse, MechSensData};
use log::{debug, trace};
use std::collections::HashMap;

use super::{Mechanism, SimAxisParams, SimMechParams, TravelLimit};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A simulated axis which moves towards its target at no more than its maximum rate.
#[derive(Debug, Clone)]
pub struct SimMech {
    id: ActId,
    params: SimAxisParams,
    target: f64,
    pos: f64,
}

/// The simulated elevator, pivot and effector, along with the sensors attached to them.
#[derive(Debug, Clone)]
pub struct SimMechSet {
    params: SimMechParams,

    elevator: SimMech,
    pivot: SimMech,
    effector: SimMech,

    beam_broken: bool,

    /// Time the effector has spent continuously pulling in (positive) or pushing out (negative).
    effector_run_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMech {
    pub fn new(id: ActId, params: SimAxisParams) -> Self {
        let start = params.start.max(params.min).min(params.max);

        Self {
            id,
            params,
            target: start,
            pos: start,
        }
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        let max_delta = self.params.max_rate * dt_s;
        self.pos += (self.target - self.pos).max(-max_delta).min(max_delta);
    }

    /// The currently commanded (clamped) target.
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Mechanism for SimMech {
    fn id(&self) -> ActId {
        self.id
    }

    fn command_target(&mut self, target: f64) {
        self.target = target.max(self.params.min).min(self.params.max);
    }

    fn position(&self) -> f64 {
        self.pos
    }

    fn at_limit(&self) -> Option<TravelLimit> {
        if self.pos <= self.params.min {
            Some(TravelLimit::Lower)
        } else if self.pos >= self.params.max {
            Some(TravelLimit::Upper)
        } else {
            None
        }
    }
}

impl SimMechSet {
    pub fn new(params: SimMechParams) -> Self {
        Self {
            elevator: SimMech::new(ActId::Elevator, params.elevator),
            pivot: SimMech::new(ActId::Pivot, params.pivot),
            effector: SimMech::new(ActId::Effector, params.effector),
            beam_broken: params.start_with_object,
            effector_run_s: 0.0,
            params,
        }
    }

    /// Get a reference to the mechanism driving the given actuator.
    pub fn mech(&self, act_id: ActId) -> &dyn Mechanism {
        match act_id {
            ActId::Elevator => &self.elevator,
            ActId::Pivot => &self.pivot,
            ActId::Effector => &self.effector,
        }
    }

    fn mech_mut(&mut self, act_id: ActId) -> &mut dyn Mechanism {
        match act_id {
            ActId::Elevator => &mut self.elevator,
            ActId::Pivot => &mut self.pivot,
            ActId::Effector => &mut self.effector,
        }
    }

    /// Command every mechanism from a set of demands.
    ///
    /// Demands which don't cover every actuator with a finite value are rejected as a whole, so
    /// the mechanisms never end up driven from a mixture of two cycles.
    pub fn dispatch(&mut self, dems: &MechDems) -> MechDemsResponse {
        if !dems.is_valid() {
            return MechDemsResponse::DemsInvalid;
        }

        for act_id in ActId::all().iter() {
            if let Some(target) = dems.get(*act_id) {
                self.mech_mut(*act_id).command_target(target);
            }

            if let Some(limit) = self.mech(*act_id).at_limit() {
                trace!("{:?} at {:?} travel limit", act_id, limit);
            }
        }

        trace!(
            "Sim targets: elevator {:.3} m, pivot {:.3} rad, effector {:.2} V",
            self.elevator.target(),
            self.pivot.target(),
            self.effector.target()
        );

        MechDemsResponse::DemsOk
    }

    /// Advance the simulation by `dt_s` seconds.
    pub fn step(&mut self, dt_s: f64) {
        self.elevator.step(dt_s);
        self.pivot.step(dt_s);
        self.effector.step(dt_s);

        // Break-beam model: running the rollers long enough in one direction takes in or ejects
        // the object.
        let effector_v = self.effector.position();
        if effector_v > 0.0 {
            self.effector_run_s = self.effector_run_s.max(0.0) + dt_s;
        } else if effector_v < 0.0 {
            self.effector_run_s = self.effector_run_s.min(0.0) - dt_s;
        } else {
            self.effector_run_s = 0.0;
        }

        if !self.beam_broken && self.effector_run_s >= self.params.beam_trip_time_s {
            debug!("Sim: object taken in");
            self.beam_broken = true;
        } else if self.beam_broken && self.effector_run_s <= -self.params.beam_trip_time_s {
            debug!("Sim: object ejected");
            self.beam_broken = false;
        }
    }

    /// Read every sensor.
    pub fn sense(&self) -> MechSensData {
        let mut pos = HashMap::new();

        for act_id in ActId::all().iter() {
            pos.insert(*act_id, self.mech(*act_id).position());
        }

        MechSensData {
            pos,
            beam_broken: self.beam_broken,
            bottom_limit: self.elevator.position()
                <= self.params.elevator.min + self.params.bottom_limit_band_m,
        }
    }
}
