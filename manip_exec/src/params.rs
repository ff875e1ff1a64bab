//! # Manipulator Executable Parameters
//!
//! This module provide parameters for the manipulator executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ManipExecParams {
    /// Script to run if none is given on the command line, relative to the software root
    pub default_script_path: String,

    /// Number of seconds to keep cycling after the last TC of the script has been executed, so
    /// that the final operation can play out.
    pub script_end_hold_s: f64,

    /// Number of consecutive cycles the mechanisms may reject demands for before safe mode is
    /// engaged.
    pub max_consec_dems_rejections: u64,

    /// Per-target log level overrides
    #[serde(default)]
    pub log_levels: Vec<LogLevelOverride>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogLevelOverride {
    /// Log target, i.e. a module path such as `manip_lib::supersys::seq`
    pub target: String,

    /// One of `Off`, `Error`, `Warn`, `Info`, `Debug` or `Trace`
    pub level: String,
}
