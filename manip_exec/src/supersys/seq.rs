//! Phase-list sequencer
//!
//! Every operation is a [`Sequence`] of [`Phase`]s run by one generic executor, [`SeqExec`]. On
//! every cycle the active phase re-affirms its target through the coordinator, then its
//! continuation condition and timeout are checked. A phase with neither is terminal and holds its
//! target until the operation is replaced.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};

use super::coordinator::{Action, Coordinator, TargetUpdate};
use super::triggers::{EdgeDetector, Trigger, TriggerCtx, Until};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One step of an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    /// Target update applied on every cycle of the phase
    pub drive: TargetUpdate,

    /// Condition which completes the phase
    pub until: Option<Until>,

    /// Maximum duration of the phase. On elapsing the operation carries on with the next phase.
    ///
    /// Units: seconds
    pub timeout_s: Option<f64>,

    /// Entry guard, sampled when the operation is scheduled. If false the whole operation is
    /// skipped.
    pub guard: Option<Trigger>,
}

/// A named operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub name: &'static str,
    pub phases: Vec<Phase>,
}

/// Executor of one scheduled sequence.
#[derive(Debug, Clone)]
pub struct SeqExec {
    seq: Sequence,

    phase_idx: usize,

    /// Start time of the current phase, `None` until the phase is entered
    phase_start_s: Option<f64>,

    edge: EdgeDetector,

    timed_out: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Phase {
    /// A phase which holds its target until the operation is replaced.
    pub fn terminal(drive: TargetUpdate) -> Self {
        Self {
            drive,
            until: None,
            timeout_s: None,
            guard: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.until.is_none() && self.timeout_s.is_none()
    }
}

impl SeqExec {
    /// Start executing a sequence.
    ///
    /// Returns `None` if an entry guard is false, in which case the operation is a no-op.
    pub fn start(seq: Sequence, ctx: &TriggerCtx) -> Option<Self> {
        for (i, phase) in seq.phases.iter().enumerate() {
            if let Some(ref guard) = phase.guard {
                if !guard.eval(ctx) {
                    debug!("{}: guard of phase {} ({:?}) is false", seq.name, i, guard);
                    return None;
                }
            }
        }

        Some(Self {
            seq,
            phase_idx: 0,
            phase_start_s: None,
            edge: EdgeDetector::default(),
            timed_out: false,
        })
    }

    /// Run one cycle of the sequence.
    ///
    /// Returns the action for this cycle, or `None` once every phase has completed.
    pub fn step(&mut self, coord: &mut Coordinator, ctx: &TriggerCtx, time_s: f64) -> Option<Action> {
        let phase = self.seq.phases.get(self.phase_idx)?;

        let start_s = match self.phase_start_s {
            Some(t) => t,
            None => {
                debug!("{}: entering phase {}", self.seq.name, self.phase_idx);
                self.edge.reset();
                self.phase_start_s = Some(time_s);
                time_s
            }
        };

        let action = coord.update(phase.drive);

        let done = match phase.until {
            Some(ref until) => until.eval(ctx, &mut self.edge),
            None => false,
        };

        if done {
            debug!(
                "{}: phase {} complete after {:.3} s",
                self.seq.name,
                self.phase_idx,
                time_s - start_s
            );
            self.advance();
        } else if let Some(timeout_s) = phase.timeout_s {
            if time_s - start_s >= timeout_s {
                warn!(
                    "{}: phase {} timed out after {:.3} s, continuing",
                    self.seq.name, self.phase_idx, timeout_s
                );
                self.timed_out = true;
                self.advance();
            }
        }

        Some(action)
    }

    fn advance(&mut self) {
        self.phase_idx += 1;
        self.phase_start_s = None;
    }

    pub fn name(&self) -> &'static str {
        self.seq.name
    }

    /// Index of the current phase.
    pub fn phase(&self) -> usize {
        self.phase_idx
    }

    /// True once every phase has completed.
    pub fn is_finished(&self) -> bool {
        self.phase_idx >= self.seq.phases.len()
    }

    /// True if any phase of this operation has timed out.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }
}
