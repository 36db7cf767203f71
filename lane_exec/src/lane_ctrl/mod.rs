//! # Lane control module
//!
//! Turns a camera frame into a discrete steering decision. Line segments are
//! extracted from the lane markings, split into left and right boundaries and
//! averaged, and the offset of the lane centre from the image centre decides
//! whether to steer. When the markings are too sparse for the segment path a
//! sliding window polynomial fit is used instead, and when nothing at all is
//! visible the side on which the lane was last seen decides.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod classify;
mod decide;
mod params;
mod poly;
mod segments;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use classify::*;
pub use params::*;
pub use poly::*;
pub use state::*;

pub use crate::vision::LineSegment;
pub use comms_if::tm::{LastSeen, SteeringDecision};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slope given to segments with no horizontal extent.
pub const VERTICAL_SLOPE: f64 = 1e6;

/// Fits with a slope magnitude at or below this can't be evaluated at a row.
pub const FLAT_SLOPE_EPS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LaneCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LaneCtrlError {
    #[error("Cannot process an empty frame ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Could not load the LaneCtrl parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Could not set up the LaneCtrl archive: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),
}
