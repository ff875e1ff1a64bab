//! # Data Store

use comms_if::eqpt::mech::{MechDems, MechSensData};
use log::{info, warn};

use crate::supersys;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the manipulator has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    MechDemsRejected,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of this cycle
    pub time_s: f64,

    // Safe mode variables
    /// Determines if the manipulator is in safe mode.
    pub safe: bool,

    /// Gives the reason for the manipulator being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Mechanisms
    pub mech_sens: MechSensData,

    // Supersystem
    pub supersys: supersys::SupersysCtrl,
    pub supersys_input: supersys::InputData,
    pub supersys_output: MechDems,
    pub supersys_status_rpt: supersys::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive cycles the mechanisms rejected the demands
    pub num_consec_dems_rejections: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the manipulator into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Drop anything the operator queued this cycle and stop the supersystem
            self.supersys_input.buttons.clear();
            self.supersys_input.cmds.clear();
            self.supersys.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    warn!(
                        "Make unsafe requested, root cause ({:?}) differs from request ({:?}), \
                        rejected",
                        root_cause, cause
                    );
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, time_s: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.time_s = time_s;

        self.supersys_input = supersys::InputData {
            time_s,
            sens: self.mech_sens.clone(),
            ..Default::default()
        };
        self.supersys_output = MechDems::default();
        self.supersys_status_rpt = supersys::StatusReport::default();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_safe_mode_causes() {
        let mut ds = DataStore::default();

        assert_eq!(ds.make_unsafe(SafeModeCause::MakeSafeTc), Ok(()));

        ds.make_safe(SafeModeCause::MechDemsRejected);
        assert!(ds.safe);

        // A second cause doesn't overwrite the first
        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert_eq!(ds.safe_cause, Some(SafeModeCause::MechDemsRejected));

        assert_eq!(ds.make_unsafe(SafeModeCause::MakeSafeTc), Err(()));
        assert!(ds.safe);
        assert_eq!(ds.make_unsafe(SafeModeCause::MechDemsRejected), Ok(()));
        assert!(!ds.safe);
    }

    #[test]
    fn test_1_hz_flag() {
        let mut ds = DataStore::default();

        ds.cycle_start(50.0, 0.0);
        assert!(ds.is_1_hz_cycle);

        ds.num_cycles = 1;
        ds.cycle_start(50.0, 0.02);
        assert!(!ds.is_1_hz_cycle);
        assert_eq!(ds.supersys_input.time_s, 0.02);
    }
}
