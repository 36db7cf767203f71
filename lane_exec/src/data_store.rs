//! # Data Store

use comms_if::{
    eqpt::drive::DriveDems,
    tc::{DriveMode, SpeedMode},
    tm::{StatusSnapshot, SteeringDecision},
};
use log::info;

use crate::{drive_ctrl, lane_ctrl, sign_policy::SignPolicy};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Session elapsed time at the start of this cycle
    pub time_s: f64,

    /// True if this cycle is the first after a 1 s boundary
    pub is_1_hz_cycle: bool,
    last_1_hz_s: f64,

    // Operating mode
    pub mode: DriveMode,

    /// Speed setting, see [`DataStore::effective_speed`] for what is demanded
    pub speed: SpeedMode,

    /// The steering decision being acted on, either from LaneCtrl or from a
    /// manual steer command
    pub last_decision: SteeringDecision,

    // LaneCtrl
    pub lane_ctrl: lane_ctrl::LaneCtrl,
    pub lane_ctrl_status_rpt: Option<lane_ctrl::StatusReport>,

    // DriveCtrl
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_output: Option<DriveDems>,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Signs
    pub sign_policy: SignPolicy,

    // Monitoring
    /// Frames processed since the last 1 Hz boundary
    frames_in_period: u64,

    /// Frames processed per second over the last full period
    pub fps: f64,

    /// Number of consecutive cycles without a frame
    pub num_consec_frame_timeouts: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a new store starting in the given mode and speed.
    pub fn new(mode: DriveMode, speed: SpeedMode) -> Self {
        Self {
            num_cycles: 0,
            time_s: 0.0,
            is_1_hz_cycle: false,
            last_1_hz_s: 0.0,
            mode,
            speed,
            last_decision: SteeringDecision::Straight,
            lane_ctrl: lane_ctrl::LaneCtrl::default(),
            lane_ctrl_status_rpt: None,
            drive_ctrl: drive_ctrl::DriveCtrl::default(),
            drive_ctrl_output: None,
            drive_ctrl_status_rpt: drive_ctrl::StatusReport::default(),
            sign_policy: SignPolicy::default(),
            frames_in_period: 0,
            fps: 0.0,
            num_consec_frame_timeouts: 0,
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the per-cycle outputs and sets the 1 Hz flag, updating the
    /// frame rate on each 1 Hz boundary.
    pub fn cycle_start(&mut self, time_s: f64) {
        self.time_s = time_s;

        let period_s = time_s - self.last_1_hz_s;
        self.is_1_hz_cycle = period_s >= 1.0;
        if self.is_1_hz_cycle {
            self.fps = self.frames_in_period as f64 / period_s;
            self.frames_in_period = 0;
            self.last_1_hz_s = time_s;
        }

        self.lane_ctrl_status_rpt = None;
        self.drive_ctrl_output = None;
    }

    /// Record that a frame was processed this cycle.
    pub fn frame_processed(&mut self) {
        self.frames_in_period += 1;
        self.num_consec_frame_timeouts = 0;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Change the drive mode.
    ///
    /// Entering `Stop` also sets the speed to stop, so leaving it again
    /// needs a new speed setting before the car moves.
    pub fn set_mode(&mut self, mode: DriveMode) {
        if mode != self.mode {
            info!("Drive mode {:?} -> {:?}", self.mode, mode);
        }

        self.mode = mode;
        if mode == DriveMode::Stop {
            self.speed = SpeedMode::Stop;
            self.sign_policy.cancel_hold();
        }
    }

    /// The speed actually demanded from the motors.
    pub fn effective_speed(&self) -> SpeedMode {
        match self.mode {
            DriveMode::Stop => SpeedMode::Stop,
            _ => self.speed,
        }
    }

    /// Snapshot of the current state for telemetry.
    pub fn status_snapshot(&self) -> StatusSnapshot {
        let state = self.lane_ctrl.lane_state();

        StatusSnapshot {
            time_s: self.time_s,
            mode: self.mode,
            speed: self.effective_speed(),
            last_decision: self.last_decision,
            last_seen: state.last_seen,
            have_left: state.have_left,
            have_right: state.have_right,
            delta_px: state.delta_px,
            fps: self.fps,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stop_mode_forces_stop() {
        let mut ds = DataStore::new(DriveMode::Auto, SpeedMode::Fast);
        assert_eq!(ds.effective_speed(), SpeedMode::Fast);

        ds.set_mode(DriveMode::Stop);
        assert_eq!(ds.speed, SpeedMode::Stop);

        // Speed changes while stopped are remembered but not applied
        ds.speed = SpeedMode::Slow;
        assert_eq!(ds.effective_speed(), SpeedMode::Stop);
        assert_eq!(ds.status_snapshot().speed, SpeedMode::Stop);

        ds.set_mode(DriveMode::Manual);
        assert_eq!(ds.effective_speed(), SpeedMode::Slow);
    }

    #[test]
    fn test_fps() {
        let mut ds = DataStore::new(DriveMode::Auto, SpeedMode::Normal);

        ds.cycle_start(0.1);
        assert!(!ds.is_1_hz_cycle);
        for _ in 0..20 {
            ds.frame_processed();
        }

        ds.cycle_start(1.0);
        assert!(ds.is_1_hz_cycle);
        assert_eq!(ds.fps, 20.0);

        ds.cycle_start(1.5);
        assert!(!ds.is_1_hz_cycle);
    }

    #[test]
    fn test_status_json() {
        let mut ds = DataStore::new(DriveMode::Manual, SpeedMode::Slow);
        ds.cycle_start(2.5);
        ds.last_decision = SteeringDecision::Left;

        let val = serde_json::to_value(ds.status_snapshot()).unwrap();
        assert_eq!(val["mode"], "MANUAL");
        assert_eq!(val["speed"], "slow");
        assert_eq!(val["last_decision"], "LEFT");
        assert_eq!(val["last_seen"], "NONE");
        assert_eq!(val["time_s"], 2.5);

        ds.set_mode(DriveMode::Stop);
        let val = serde_json::to_value(ds.status_snapshot()).unwrap();
        assert_eq!(val["speed"], "stop");
    }
}
