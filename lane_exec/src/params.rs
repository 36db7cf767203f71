//! Parameters for the lane following executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::tc::{DriveMode, SpeedMode};
use serde::{Deserialize, Serialize};

use crate::mech::MechParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the control loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneExecParams {
    /// Mode at start up
    pub initial_mode: DriveMode,

    /// Speed setting at start up
    pub initial_speed: SpeedMode,

    /// How long the loop waits for a frame before running without one.
    ///
    /// Units: seconds
    pub frame_timeout_s: f64,

    /// Number of consecutive frame timeouts after which the motors are
    /// stopped until frames arrive again
    pub max_consec_frame_timeouts: u64,

    /// Frame rate at which recorded frames are replayed, zero for as fast as
    /// possible.
    ///
    /// Units: frames/second
    pub replay_fps: f64,

    /// Save an annotated copy of every Nth frame, zero to disable
    pub save_annotated_every: u64,

    /// Drive the real hardware when running on a Raspberry Pi
    pub use_hardware: bool,

    pub mech: MechParams,
}

impl Default for LaneExecParams {
    fn default() -> Self {
        Self {
            initial_mode: DriveMode::Auto,
            initial_speed: SpeedMode::Fast,
            frame_timeout_s: 0.2,
            max_consec_frame_timeouts: 25,
            replay_fps: 30.0,
            save_annotated_every: 30,
            use_hardware: true,
            mech: MechParams::default(),
        }
    }
}
