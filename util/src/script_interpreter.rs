//! # Remote command script interpreter
//!
//! Replays remote commands from a script file, so that a drive can be run
//! without an operator. Each command in the script has the form
//!
//! ```text
//! <time_s>: <json>;
//! ```
//!
//! where `time_s` is the session-relative time at which the command becomes
//! due and `json` is a [`RemoteCmd`] object, for example
//! `2.5: {"mode": "MANUAL", "steer": "left"};`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use comms_if::tc::{RemoteCmd, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: RemoteCmd,
}

/// A script interpreter.
///
/// After loading a script use [`ScriptInterpreter::get_pending`] each cycle
/// to acquire the commands that have become due.
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, TcParseError),
}

/// Result of polling the interpreter for due commands.
#[derive(Debug)]
pub enum PendingCmds {
    None,
    Some(Vec<RemoteCmd>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.display().to_string()));
        }

        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_str(&script)
    }

    /// Create a new interpreter from the script's contents.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut cmd_queue: VecDeque<Command> = VecDeque::new();

        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let (time_str, json_str) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(j)) => (t.as_str(), j.as_str()),
                _ => continue,
            };

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // The scripts contain JSON only
            let cmd = RemoteCmd::from_json(json_str)
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            cmd_queue.push_back(Command { exec_time_s, cmd });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        // Commands are released in time order even if the script isn't sorted
        cmd_queue
            .make_contiguous()
            .sort_by(|a, b| {
                a.exec_time_s
                    .partial_cmp(&b.exec_time_s)
                    .unwrap_or(Ordering::Equal)
            });

        Ok(ScriptInterpreter { cmds: cmd_queue })
    }

    /// Return the commands due at `current_time_s`.
    pub fn get_pending(&mut self, current_time_s: f64) -> PendingCmds {
        // If the queue is empty the script is over
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut due = vec![];

        while let Some(front) = self.cmds.front() {
            if front.exec_time_s > current_time_s {
                break;
            }
            if let Some(c) = self.cmds.pop_front() {
                due.push(c.cmd);
            }
        }

        if due.is_empty() {
            PendingCmds::None
        } else {
            PendingCmds::Some(due)
        }
    }

    /// Get the number of commands left in the script
    pub fn get_num_cmds(&self) -> usize {
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
    use comms_if::tc::{DriveMode, ManualSteer, SpeedMode};

    const SCRIPT: &str = r#"
        0.0: {"mode": "MANUAL"};
        1.5: {"steer": "left", "speed": "slow"};
        1.0: {"speed": "normal"};
        4: {"mode": "auto"};
    "#;

    #[test]
    fn test_script_release_order() {
        let mut si = ScriptInterpreter::from_str(SCRIPT).unwrap();

        assert_eq!(si.get_num_cmds(), 4);
        assert_eq!(si.get_duration(), 4.0);

        match si.get_pending(0.5) {
            PendingCmds::Some(cmds) => {
                assert_eq!(cmds.len(), 1);
                assert_eq!(cmds[0].mode, Some(DriveMode::Manual));
            }
            p => panic!("Expected one command, got {:?}", p),
        }

        assert!(matches!(si.get_pending(0.9), PendingCmds::None));

        match si.get_pending(2.0) {
            PendingCmds::Some(cmds) => {
                assert_eq!(cmds.len(), 2);
                assert_eq!(cmds[0].speed, Some(SpeedMode::Normal));
                assert_eq!(cmds[1].steer, Some(ManualSteer::Left));
                assert_eq!(cmds[1].speed, Some(SpeedMode::Slow));
            }
            p => panic!("Expected two commands, got {:?}", p),
        }

        match si.get_pending(10.0) {
            PendingCmds::Some(cmds) => assert_eq!(cmds[0].mode, Some(DriveMode::Auto)),
            p => panic!("Expected one command, got {:?}", p),
        }

        assert!(matches!(si.get_pending(11.0), PendingCmds::EndOfScript));
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            ScriptInterpreter::from_str("# nothing to see here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::from_str("1.0: {\"mode\": ;"),
            Err(ScriptError::InvalidCmd(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::new("/nonexistent/drive.script"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
