//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod supersys;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use supersys::SupersysCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the manipulator by the operator
/// station or a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// Put the manipulator into safe mode
    MakeSafe,

    /// Attempt to leave safe mode
    MakeUnsafe,

    /// A change in the state of an operator button.
    ///
    /// What the button does is decided by the binding table of the
    /// supersystem.
    Button { id: u8, pressed: bool },

    /// Schedule a supersystem command directly, as if a button bound to it
    /// had been pressed.
    Supersys(SupersysCmd),

    /// Set or clear the presence sensor override.
    PresenceOverride { active: bool },

    /// Set or clear the manual turtle (reduced drive speed) flag.
    TurtleOverride { active: bool },
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use supersys::CoralLayer;

    #[test]
    fn test_parse_tcs() {
        assert_eq!(Tc::from_json("\"MakeSafe\"").unwrap(), Tc::MakeSafe);

        assert_eq!(
            Tc::from_json(r#"{"Button": {"id": 81, "pressed": true}}"#).unwrap(),
            Tc::Button {
                id: 81,
                pressed: true
            }
        );

        assert_eq!(
            Tc::from_json(r#"{"Supersys": {"op": "CoralScore", "layer": "L3"}}"#).unwrap(),
            Tc::Supersys(SupersysCmd::CoralScore {
                layer: CoralLayer::L3
            })
        );

        assert_eq!(
            Tc::from_json(r#"{"Supersys": {"op": "IntakeLoad"}}"#).unwrap(),
            Tc::Supersys(SupersysCmd::IntakeLoad)
        );
    }

    #[test]
    fn test_reject_unknown_tc() {
        assert!(Tc::from_json(r#"{"LocoCtrlMnvr": {}}"#).is_err());
        assert!(Tc::from_json("not json").is_err());
    }
}
