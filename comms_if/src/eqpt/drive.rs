//! # Drive Train Equipment Communications Module
//!
//! Demands sent to the steering servo and the two rear drive motors.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands for the drive train.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveDems {
    /// Steering servo PWM duty cycle, in percent of the PWM period.
    pub steer_duty_pct: f64,

    /// Left motor speed as a fraction of full speed, in the range [0, 1].
    pub left_speed: f64,

    /// Right motor speed as a fraction of full speed, in the range [0, 1].
    pub right_speed: f64,

    /// Direction both motors turn in.
    pub direction: MotorDir,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorDir {
    Forward,
    Reverse,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDems {
    /// Demands which hold the motors stopped with the steering at the given duty cycle.
    pub fn stopped(steer_duty_pct: f64) -> Self {
        Self {
            steer_duty_pct,
            left_speed: 0.0,
            right_speed: 0.0,
            direction: MotorDir::Forward,
        }
    }

    /// True if neither motor is being driven.
    pub fn is_stopped(&self) -> bool {
        self.left_speed == 0.0 && self.right_speed == 0.0
    }
}
