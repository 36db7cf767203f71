//! Drive control module
//!
//! Converts a steering decision and a speed setting into demands for the
//! steering servo and drive motors. Steering is open loop with three fixed
//! servo positions.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load the DriveCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Could not set up the DriveCtrl archive: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),

    #[error("Invalid DriveCtrl parameters: {0}")]
    InvalidParams(String),
}
