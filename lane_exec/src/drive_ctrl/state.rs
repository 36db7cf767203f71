//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{DriveCtrlError, Params};
use comms_if::{
    eqpt::drive::{DriveDems, MotorDir},
    tc::SpeedMode,
    tm::SteeringDecision,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    params: Params,

    report: StatusReport,
    arch_report: Archiver,

    output: Option<DriveDems>,
    arch_output: Archiver,
}

/// Input data to Drive Control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Which way to point the steering
    pub steer: SteeringDecision,

    /// How fast to drive
    pub speed: SpeedMode,
}

/// Status report for DriveCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// True if the steering demand differs from the previous cycle
    pub steer_changed: bool,

    /// True if the motors are demanded stopped
    pub stopped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for InputData {
    fn default() -> Self {
        Self {
            steer: SteeringDecision::Straight,
            speed: SpeedMode::Stop,
        }
    }
}

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = DriveDems;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the name of the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        *self = Self::new(params::load(init_data)?)?;

        let mut arch_path = session.arch_root.clone();
        arch_path.push("drive_ctrl");
        std::fs::create_dir_all(arch_path).map_err(ArchiveError::FileError)?;

        self.arch_report = Archiver::from_path(session, "drive_ctrl/status_report.csv")?;
        self.arch_output = Archiver::from_path(session, "drive_ctrl/output.csv")?;

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let steer_duty_pct = self.steer_duty_pct(input_data.steer);
        let speed = self.speed(input_data.speed);

        let output = DriveDems {
            steer_duty_pct,
            left_speed: speed,
            right_speed: speed,
            direction: MotorDir::Forward,
        };

        self.report = StatusReport {
            steer_changed: self
                .output
                .map_or(true, |o| o.steer_duty_pct != output.steer_duty_pct),
            stopped: output.is_stopped(),
        };

        if self.report.steer_changed {
            debug!(
                "Steering to {:?} ({:.1} % duty)",
                input_data.steer, steer_duty_pct
            );
        }

        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)?;
        if let Some(o) = self.output {
            self.arch_output.serialise(o)?;
        }
        Ok(())
    }
}

impl DriveCtrl {
    /// Create a new drive controller without archiving.
    pub fn new(params: Params) -> Result<Self, DriveCtrlError> {
        params.validate().map_err(DriveCtrlError::InvalidParams)?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Demands which stop the car with the steering centred.
    pub fn safe_dems(&self) -> DriveDems {
        DriveDems::stopped(self.params.steer_center_duty_pct)
    }

    fn steer_duty_pct(&self, steer: SteeringDecision) -> f64 {
        match steer {
            SteeringDecision::Left => self.params.steer_left_duty_pct,
            SteeringDecision::Straight => self.params.steer_center_duty_pct,
            SteeringDecision::Right => self.params.steer_right_duty_pct,
        }
    }

    fn speed(&self, speed: SpeedMode) -> f64 {
        match speed {
            SpeedMode::Fast => self.params.speed_fast,
            SpeedMode::Normal => self.params.speed_normal,
            SpeedMode::Slow => self.params.speed_slow,
            SpeedMode::Stop => 0.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input(steer: SteeringDecision, speed: SpeedMode) -> InputData {
        InputData { steer, speed }
    }

    #[test]
    fn test_demands() {
        let mut dc = DriveCtrl::new(Params::default()).unwrap();

        let (dems, rpt) = dc
            .proc(&input(SteeringDecision::Left, SpeedMode::Normal))
            .unwrap();
        assert_eq!(dems.steer_duty_pct, 3.8);
        assert_eq!((dems.left_speed, dems.right_speed), (0.8, 0.8));
        assert_eq!(dems.direction, MotorDir::Forward);
        assert!(rpt.steer_changed && !rpt.stopped);

        let (dems, rpt) = dc
            .proc(&input(SteeringDecision::Left, SpeedMode::Fast))
            .unwrap();
        assert_eq!(dems.left_speed, 1.0);
        assert!(!rpt.steer_changed);

        let (dems, rpt) = dc
            .proc(&input(SteeringDecision::Right, SpeedMode::Stop))
            .unwrap();
        assert_eq!(dems.steer_duty_pct, 6.5);
        assert!(rpt.steer_changed && rpt.stopped);

        let (dems, _) = dc
            .proc(&input(SteeringDecision::Straight, SpeedMode::Slow))
            .unwrap();
        assert_eq!((dems.steer_duty_pct, dems.left_speed), (5.0, 0.5));
    }

    #[test]
    fn test_invalid_params() {
        let params = Params {
            speed_fast: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            DriveCtrl::new(params),
            Err(DriveCtrlError::InvalidParams(_))
        ));
    }
}
