//! # Telemetry module
//!
//! Status published by the car so that an operator or logging tool can see
//! what the lane follower is doing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::tc::{DriveMode, ManualSteer, SpeedMode};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of the car's state, saved periodically as `status.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Session elapsed time the snapshot was taken at
    pub time_s: f64,

    pub mode: DriveMode,
    pub speed: SpeedMode,

    /// The decision currently being acted on
    pub last_decision: SteeringDecision,

    /// Which lane boundaries were most recently seen
    pub last_seen: LastSeen,

    pub have_left: bool,
    pub have_right: bool,

    /// Offset of the lane centre from the image centre, positive when the
    /// lane centre is to the right
    pub delta_px: i32,

    /// Frames processed per second over the last reporting period
    pub fps: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Discrete steering decision made from one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SteeringDecision {
    Straight,
    Left,
    Right,
}

/// Which lane boundaries were visible the last time any were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LastSeen {
    None,
    Left,
    Right,
    Both,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SteeringDecision {
    fn default() -> Self {
        SteeringDecision::Straight
    }
}

impl Default for LastSeen {
    fn default() -> Self {
        LastSeen::None
    }
}

impl From<ManualSteer> for SteeringDecision {
    fn from(steer: ManualSteer) -> Self {
        match steer {
            ManualSteer::Left => SteeringDecision::Left,
            ManualSteer::Center => SteeringDecision::Straight,
            ManualSteer::Right => SteeringDecision::Right,
        }
    }
}

impl LastSeen {
    /// Build from the presence of each boundary.
    pub fn from_sides(have_left: bool, have_right: bool) -> Self {
        match (have_left, have_right) {
            (true, true) => LastSeen::Both,
            (true, false) => LastSeen::Left,
            (false, true) => LastSeen::Right,
            (false, false) => LastSeen::None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_snapshot_json() {
        let snap = StatusSnapshot {
            time_s: 1.5,
            mode: DriveMode::Auto,
            speed: SpeedMode::Normal,
            last_decision: SteeringDecision::Left,
            last_seen: LastSeen::from_sides(true, false),
            have_left: true,
            have_right: false,
            delta_px: -64,
            fps: 12.0,
        };

        let val = serde_json::to_value(&snap).unwrap();

        assert_eq!(val["mode"], "AUTO");
        assert_eq!(val["speed"], "normal");
        assert_eq!(val["last_decision"], "LEFT");
        assert_eq!(val["last_seen"], "LEFT");
        assert_eq!(val["delta_px"], -64);
    }
}
