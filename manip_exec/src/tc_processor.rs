//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::tc::Tc;
use manip_lib::{
    data_store::{DataStore, SafeModeCause},
    supersys::ButtonEvent,
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. While in safe mode everything
/// other than `MakeUnsafe` is rejected.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {
    if ds.safe {
        match tc {
            Tc::MakeUnsafe | Tc::MakeSafe => (),
            _ => {
                warn!("In safe mode, rejecting {:?}", tc);
                return;
            }
        }
    }

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::Button { id, pressed } => ds.supersys_input.buttons.push(ButtonEvent {
            id: *id,
            pressed: *pressed,
        }),
        Tc::Supersys(cmd) => {
            debug!("Recieved supersystem command {}", cmd);
            ds.supersys_input.cmds.push(*cmd);
        }
        Tc::PresenceOverride { active } => ds.supersys_input.presence_override = Some(*active),
        Tc::TurtleOverride { active } => ds.supersys_input.turtle_override = Some(*active),
    }
}
