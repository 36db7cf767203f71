//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Drive control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- STEERING ----
    /// PWM frequency of the steering servo.
    ///
    /// Units: Hertz
    pub servo_freq_hz: f64,

    /// Servo duty cycle for a full left turn.
    ///
    /// Units: percent
    pub steer_left_duty_pct: f64,

    /// Servo duty cycle for driving straight.
    ///
    /// Units: percent
    pub steer_center_duty_pct: f64,

    /// Servo duty cycle for a full right turn.
    ///
    /// Units: percent
    pub steer_right_duty_pct: f64,

    // ---- SPEED ----
    /// Motor speeds for each speed setting, as a fraction of full speed.
    pub speed_fast: f64,
    pub speed_normal: f64,
    pub speed_slow: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            servo_freq_hz: 50.0,
            steer_left_duty_pct: 3.8,
            steer_center_duty_pct: 5.0,
            steer_right_duty_pct: 6.5,
            speed_fast: 1.0,
            speed_normal: 0.8,
            speed_slow: 0.5,
        }
    }
}

impl Params {
    /// Check the parameters describe a usable drive train.
    pub fn validate(&self) -> Result<(), String> {
        for (name, duty) in [
            ("steer_left_duty_pct", self.steer_left_duty_pct),
            ("steer_center_duty_pct", self.steer_center_duty_pct),
            ("steer_right_duty_pct", self.steer_right_duty_pct),
        ]
        .iter()
        {
            if !(0.0..=100.0).contains(duty) {
                return Err(format!("{} must be a percentage, got {}", name, duty));
            }
        }

        for (name, speed) in [
            ("speed_fast", self.speed_fast),
            ("speed_normal", self.speed_normal),
            ("speed_slow", self.speed_slow),
        ]
        .iter()
        {
            if !(0.0..=1.0).contains(speed) {
                return Err(format!("{} must be between 0 and 1, got {}", name, speed));
            }
        }

        if self.servo_freq_hz <= 0.0 {
            return Err(format!("servo_freq_hz must be positive, got {}", self.servo_freq_hz));
        }

        Ok(())
    }
}
