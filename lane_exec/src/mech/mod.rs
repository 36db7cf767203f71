//! # Mechanisms Module
//!
//! This module provides a unified interface to the car's drive train, so that
//! the control loop can run identically against the real hardware or a
//! simulated driver.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`DriveDriver`] implementation for the Raspberry Pi GPIO header.
#[cfg(all(target_os = "linux", any(target_arch = "arm", target_arch = "aarch64")))]
pub mod rpi;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::DriveDems;
use log::{debug, info};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for drive train hardware.
pub trait DriveDriver {
    /// Apply the demands to the servo and motors.
    fn actuate(&mut self, dems: &DriveDems) -> Result<(), MechError>;

    /// Stop both motors, leaving the steering where it is.
    fn stop(&mut self) -> Result<(), MechError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// GPIO assignment of the drive train, BCM numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MechParams {
    /// Steering servo signal
    pub servo_pin: u8,

    /// Left motor H-bridge inputs
    pub left_fwd_pin: u8,
    pub left_bwd_pin: u8,

    /// Right motor H-bridge inputs
    pub right_fwd_pin: u8,
    pub right_bwd_pin: u8,

    /// H-bridge enable inputs, driven with PWM to set the motor speed
    pub left_enable_pin: u8,
    pub right_enable_pin: u8,

    /// PWM frequency of the motor enable pins.
    ///
    /// Units: Hertz
    pub motor_pwm_freq_hz: f64,

    /// PWM frequency of the steering servo.
    ///
    /// Units: Hertz
    pub servo_freq_hz: f64,
}

/// A driver which only records and logs the demands it receives.
#[derive(Debug, Default)]
pub struct SimDriver {
    last_dems: Option<DriveDems>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MechError {
    #[error("Could not access the GPIO: {0}")]
    GpioError(String),

    #[error("Demand out of range: {0}")]
    InvalidDemand(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MechParams {
    fn default() -> Self {
        Self {
            servo_pin: 17,
            left_fwd_pin: 27,
            left_bwd_pin: 22,
            right_fwd_pin: 23,
            right_bwd_pin: 24,
            left_enable_pin: 18,
            right_enable_pin: 19,
            motor_pwm_freq_hz: 100.0,
            servo_freq_hz: 50.0,
        }
    }
}

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently actuated demands.
    pub fn last_dems(&self) -> Option<&DriveDems> {
        self.last_dems.as_ref()
    }
}

impl DriveDriver for SimDriver {
    fn actuate(&mut self, dems: &DriveDems) -> Result<(), MechError> {
        check_dems(dems)?;

        if self.last_dems.as_ref() != Some(dems) {
            debug!("SimDriver demands: {:?}", dems);
        }

        self.last_dems = Some(*dems);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MechError> {
        info!("SimDriver stopping motors");

        let steer = self.last_dems.map_or(0.0, |d| d.steer_duty_pct);
        self.last_dems = Some(DriveDems::stopped(steer));
        Ok(())
    }
}

/// Reject demands no driver can apply.
pub fn check_dems(dems: &DriveDems) -> Result<(), MechError> {
    if !(0.0..=100.0).contains(&dems.steer_duty_pct) {
        return Err(MechError::InvalidDemand(format!(
            "steering duty cycle {} %",
            dems.steer_duty_pct
        )));
    }

    for speed in [dems.left_speed, dems.right_speed].iter() {
        if !(0.0..=1.0).contains(speed) {
            return Err(MechError::InvalidDemand(format!("motor speed {}", speed)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::drive::MotorDir;

    #[test]
    fn test_sim_driver() {
        let mut drv = SimDriver::new();
        let dems = DriveDems {
            steer_duty_pct: 6.5,
            left_speed: 0.8,
            right_speed: 0.8,
            direction: MotorDir::Forward,
        };

        drv.actuate(&dems).unwrap();
        assert_eq!(drv.last_dems(), Some(&dems));

        drv.stop().unwrap();
        let stopped = drv.last_dems().unwrap();
        assert!(stopped.is_stopped());
        assert_eq!(stopped.steer_duty_pct, 6.5);
    }

    #[test]
    fn test_invalid_demands_rejected() {
        let mut drv = SimDriver::new();
        let mut dems = DriveDems::stopped(5.0);
        dems.left_speed = 1.2;

        assert!(matches!(drv.actuate(&dems), Err(MechError::InvalidDemand(_))));
        assert!(drv.last_dems().is_none());
    }
}
