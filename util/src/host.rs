//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the software root directory.
///
/// Parameter files are loaded from `<root>/params` and sessions are created
/// in `<root>/sessions`.
pub const SW_ROOT_ENV_VAR: &str = "LANE_CAR_SW_ROOT";

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}

/// Get a short description of the host (OS and architecture).
pub fn get_platform() -> String {
    format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH)
}
