//! # Remote command processor module
//!
//! Applies remote commands, from whichever source, to the data store.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use crate::data_store::DataStore;
use comms_if::tc::{DriveMode, RemoteCmd};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a remote command.
///
/// Mode is applied first, so a command which both enters manual mode and
/// steers takes effect in one go.
pub fn exec(ds: &mut DataStore, cmd: &RemoteCmd) {
    if cmd.is_empty() {
        debug!("Ignoring empty remote command");
        return;
    }

    if let Some(mode) = cmd.mode {
        ds.set_mode(mode);
    }

    if let Some(speed) = cmd.speed {
        info!("Speed set to {:?}", speed);
        ds.speed = speed;
    }

    if let Some(steer) = cmd.steer {
        if ds.mode == DriveMode::Manual {
            ds.last_decision = steer.into();
            debug!("Manual steer {:?}", steer);
        } else {
            debug!("Ignoring manual steer in {:?} mode", ds.mode);
        }
    }

    if let Some(ref sign) = cmd.sign {
        if let Some(speed) = ds.sign_policy.on_detection(sign, ds.time_s) {
            ds.speed = speed;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::{
        tc::SpeedMode,
        tm::SteeringDecision,
    };

    fn exec_json(ds: &mut DataStore, json: &str) {
        exec(ds, &RemoteCmd::from_json(json).unwrap());
    }

    #[test]
    fn test_manual_steer_only_in_manual() {
        let mut ds = DataStore::new(DriveMode::Auto, SpeedMode::Normal);

        exec_json(&mut ds, r#"{"steer": "left"}"#);
        assert_eq!(ds.last_decision, SteeringDecision::Straight);

        exec_json(&mut ds, r#"{"mode": "manual", "steer": "right"}"#);
        assert_eq!(ds.mode, DriveMode::Manual);
        assert_eq!(ds.last_decision, SteeringDecision::Right);

        exec_json(&mut ds, r#"{"steer": "center"}"#);
        assert_eq!(ds.last_decision, SteeringDecision::Straight);
    }

    #[test]
    fn test_stop_then_speed() {
        let mut ds = DataStore::new(DriveMode::Auto, SpeedMode::Fast);

        exec_json(&mut ds, r#"{"mode": "STOP"}"#);
        assert_eq!(ds.speed, SpeedMode::Stop);

        exec_json(&mut ds, r#"{"mode": "AUTO", "speed": "slow"}"#);
        assert_eq!(ds.effective_speed(), SpeedMode::Slow);
    }

    #[test]
    fn test_sign_changes_speed() {
        let mut ds = DataStore::new(DriveMode::Auto, SpeedMode::Normal);
        ds.time_s = 5.0;

        exec_json(&mut ds, r#"{"sign": {"label": "stop_sign", "confidence": 0.9}}"#);
        assert_eq!(ds.speed, SpeedMode::Stop);
        assert!(ds.sign_policy.is_holding());
    }
}
