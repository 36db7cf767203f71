//! # Remote command module
//!
//! Remote commands are small JSON objects which change how the car drives,
//! for example
//!
//! ```text
//! {"mode": "MANUAL", "speed": "slow", "steer": "left"}
//! {"sign": {"label": "stop", "confidence": 0.92}}
//! ```
//!
//! Every field is optional. Values are matched case-insensitively, and values
//! which are not recognised are logged and ignored rather than rejecting the
//! whole command.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A remote command, i.e. an instruction sent to the car by an operator,
/// a drive script, or an external sign detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteCmd {
    /// New drive mode
    pub mode: Option<DriveMode>,

    /// New speed setting
    pub speed: Option<SpeedMode>,

    /// New manual steering position, only applied in manual mode
    pub steer: Option<ManualSteer>,

    /// A traffic sign reported by the sign detector
    pub sign: Option<SignDetection>,
}

/// A traffic sign seen by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignDetection {
    /// The class label of the sign, lowercase
    pub label: String,

    /// Detector confidence in the range [0, 1]
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Who is in charge of steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriveMode {
    /// Steering follows the lane
    Auto,

    /// Steering follows the last manual steer command
    Manual,

    /// Motors are held stopped
    Stop,
}

/// Speed setting of the drive motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    Slow,
    Normal,
    Fast,
    Stop,
}

/// Manual steering position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualSteer {
    Left,
    Center,
    Right,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Command must be a JSON object, got {0}")]
    NotAnObject(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RemoteCmd {
    /// Parse a new command from a JSON string.
    ///
    /// Only malformed JSON, or JSON which isn't an object, is an error.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        if !val.is_object() {
            return Err(TcParseError::NotAnObject(val.to_string()));
        }

        Ok(RemoteCmd {
            mode: parse_field(&val, "mode", DriveMode::parse_ci),
            speed: parse_field(&val, "speed", SpeedMode::parse_ci),
            steer: parse_field(&val, "steer", ManualSteer::parse_ci),
            sign: parse_sign(&val["sign"]),
        })
    }

    /// True if the command carries nothing to act on.
    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.speed.is_none() && self.steer.is_none() && self.sign.is_none()
    }
}

impl DriveMode {
    /// Case-insensitive match on the variant name.
    fn parse_ci(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AUTO" => Some(DriveMode::Auto),
            "MANUAL" => Some(DriveMode::Manual),
            "STOP" => Some(DriveMode::Stop),
            _ => None,
        }
    }
}

impl SpeedMode {
    fn parse_ci(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Some(SpeedMode::Slow),
            "normal" => Some(SpeedMode::Normal),
            "fast" => Some(SpeedMode::Fast),
            "stop" => Some(SpeedMode::Stop),
            _ => None,
        }
    }
}

impl ManualSteer {
    /// Accepts both spellings of centre.
    fn parse_ci(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(ManualSteer::Left),
            "center" | "centre" => Some(ManualSteer::Center),
            "right" => Some(ManualSteer::Right),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse an optional string field with the given parser, warning about and
/// dropping unrecognised values.
fn parse_field<T>(val: &Value, key: &str, parser: fn(&str) -> Option<T>) -> Option<T> {
    match &val[key] {
        Value::Null => None,
        Value::String(s) => {
            let parsed = parser(s.trim());
            if parsed.is_none() {
                warn!("Ignoring unrecognised {} value \"{}\"", key, s);
            }
            parsed
        }
        other => {
            warn!("Ignoring {} value {}, expected a string", key, other);
            None
        }
    }
}

fn parse_sign(val: &Value) -> Option<SignDetection> {
    if val.is_null() {
        return None;
    }

    match (val["label"].as_str(), val["confidence"].as_f64()) {
        (Some(label), Some(confidence)) => Some(SignDetection {
            label: label.trim().to_ascii_lowercase(),
            confidence,
        }),
        _ => {
            warn!("Ignoring malformed sign detection {}", val);
            None
        }
    }
}
