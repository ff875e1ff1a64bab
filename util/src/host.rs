//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the software checkout.
pub const SW_ROOT_ENV: &str = "MANIP_SW_ROOT";

/// Get the root directory of the software, which contains the `params` and `sessions`
/// directories.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV).map(PathBuf::from)
}
