//! Drive train on the Raspberry Pi GPIO header.
//!
//! The steering servo and both motor enables use software PWM, the H-bridge
//! direction inputs are plain digital outputs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::{DriveDems, MotorDir};
use log::{debug, info, warn};
use rppal::gpio::{Gpio, OutputPin};

use super::{check_dems, DriveDriver, MechError, MechParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One side of the drive train.
struct Motor {
    fwd: OutputPin,
    bwd: OutputPin,
    enable: OutputPin,
}

/// Drive train driver for the Raspberry Pi.
pub struct RpiDriver {
    servo: OutputPin,
    left: Motor,
    right: Motor,

    servo_freq_hz: f64,
    motor_pwm_freq_hz: f64,

    /// Servo duty cycle currently being output, the servo is only rewritten
    /// when this changes
    current_steer_duty_pct: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Motor {
    fn set(&mut self, dir: MotorDir, speed: f64, pwm_freq_hz: f64) -> Result<(), MechError> {
        match dir {
            MotorDir::Forward => {
                self.fwd.set_high();
                self.bwd.set_low();
            }
            MotorDir::Reverse => {
                self.fwd.set_low();
                self.bwd.set_high();
            }
        }

        self.enable
            .set_pwm_frequency(pwm_freq_hz, speed)
            .map_err(gpio_err)
    }

    fn stop(&mut self) -> Result<(), MechError> {
        self.enable.clear_pwm().map_err(gpio_err)?;
        self.enable.set_low();
        Ok(())
    }
}

impl RpiDriver {
    /// Claim the GPIO pins and centre the steering at the given duty cycle.
    pub fn new(params: &MechParams, center_duty_pct: f64) -> Result<Self, MechError> {
        let gpio = Gpio::new().map_err(gpio_err)?;
        let output = |pin: u8| -> Result<OutputPin, MechError> {
            Ok(gpio.get(pin).map_err(gpio_err)?.into_output_low())
        };

        let mut driver = Self {
            servo: output(params.servo_pin)?,
            left: Motor {
                fwd: output(params.left_fwd_pin)?,
                bwd: output(params.left_bwd_pin)?,
                enable: output(params.left_enable_pin)?,
            },
            right: Motor {
                fwd: output(params.right_fwd_pin)?,
                bwd: output(params.right_bwd_pin)?,
                enable: output(params.right_enable_pin)?,
            },
            servo_freq_hz: params.servo_freq_hz,
            motor_pwm_freq_hz: params.motor_pwm_freq_hz,
            current_steer_duty_pct: None,
        };

        driver.set_steer(center_duty_pct)?;
        info!("RpiDriver initialised, steering centred on BCM {}", params.servo_pin);

        Ok(driver)
    }

    fn set_steer(&mut self, duty_pct: f64) -> Result<(), MechError> {
        if self.current_steer_duty_pct == Some(duty_pct) {
            return Ok(());
        }

        debug!("Servo duty cycle {:.1} %", duty_pct);
        self.servo
            .set_pwm_frequency(self.servo_freq_hz, duty_pct / 100.0)
            .map_err(gpio_err)?;
        self.current_steer_duty_pct = Some(duty_pct);

        Ok(())
    }
}

impl DriveDriver for RpiDriver {
    fn actuate(&mut self, dems: &DriveDems) -> Result<(), MechError> {
        check_dems(dems)?;

        self.set_steer(dems.steer_duty_pct)?;

        let freq = self.motor_pwm_freq_hz;
        self.left.set(dems.direction, dems.left_speed, freq)?;
        self.right.set(dems.direction, dems.right_speed, freq)
    }

    fn stop(&mut self) -> Result<(), MechError> {
        self.left.stop()?;
        self.right.stop()
    }
}

impl Drop for RpiDriver {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Could not stop the motors: {}", e);
        }
    }
}

fn gpio_err(e: rppal::gpio::Error) -> MechError {
    MechError::GpioError(e.to_string())
}
