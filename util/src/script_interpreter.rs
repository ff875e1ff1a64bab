//! # Manipulator script interpreter module
//!
//! This module provides an interpreter for timed telecommand scripts, allowing a sequence of
//! operator inputs to be replayed against the manipulator.
//!
//! A script is a list of `<time_s>: <tc_json>;` entries, e.g.
//!
//! ```text
//! 0.5: {"Button": {"id": 81, "pressed": true}};
//! 0.6: {"Button": {"id": 81, "pressed": false}};
//! ```
//!
//! Anything not matching this form (comments, blank lines) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
#[derive(Debug)]
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_tcs` to
/// acquire a list of telecommands that need executing.
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),

    #[error("Cannot build the script pattern: {0}")]
    BadPattern(regex::Error),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    NonMonotonic(f64, f64),
}

#[derive(Debug, PartialEq)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut interp = Self::from_str(&script)?;
        interp.script_path = Some(path);

        Ok(interp)
    }

    /// Create a new interpreter from the text of a script.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(ScriptError::BadPattern)?;

        let mut last_time_s = 0f64;

        for cap in re.captures_iter(script) {
            let (time_str, payload) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue,
            };

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if exec_time_s < last_time_s {
                return Err(ScriptError::NonMonotonic(last_time_s, exec_time_s));
            }
            last_time_s = exec_time_s;

            // The scripts contain JSON only.
            let tc = Tc::from_json(payload).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: None,
            cmds: tc_queue,
        })
    }

    /// Return the TCs due at or before `current_time_s`, in script order.
    pub fn get_pending_tcs(&mut self, current_time_s: f64) -> PendingTcs {
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s > current_time_s {
                break;
            }
            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Path the script was loaded from, if any
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        // Catch a coral then score it on L2
        0.0: {"Supersys": {"op": "IntakeSetup"}};
        0.5: {"Button": {"id": 81, "pressed": true}};
        0.5: {"Button": {"id": 81, "pressed": false}};
        2.0: "MakeSafe";
    "#;

    #[test]
    fn test_pending_tcs() {
        let mut interp = ScriptInterpreter::from_str(SCRIPT).unwrap();
        assert_eq!(interp.get_num_tcs(), 4);
        assert_eq!(interp.get_duration(), 2.0);
        assert!(interp.script_path().is_none());

        match interp.get_pending_tcs(0.0) {
            PendingTcs::Some(v) => assert_eq!(v.len(), 1),
            p => panic!("Expected one TC, got {:?}", p),
        }
        assert_eq!(interp.get_pending_tcs(0.4), PendingTcs::None);
        match interp.get_pending_tcs(1.0) {
            PendingTcs::Some(v) => assert_eq!(
                v,
                vec![
                    Tc::Button {
                        id: 81,
                        pressed: true
                    },
                    Tc::Button {
                        id: 81,
                        pressed: false
                    }
                ]
            ),
            p => panic!("Expected two TCs, got {:?}", p),
        }
        assert_eq!(
            interp.get_pending_tcs(3.0),
            PendingTcs::Some(vec![Tc::MakeSafe])
        );
        assert_eq!(interp.get_pending_tcs(3.0), PendingTcs::EndOfScript);
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::from_str("nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_str(r#"1.0: {"Nope": 1};"#),
            Err(ScriptError::InvalidTc(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::from_str("1.0: \"MakeSafe\";\n0.5: \"MakeUnsafe\";"),
            Err(ScriptError::NonMonotonic(_, _))
        ));
    }
}
