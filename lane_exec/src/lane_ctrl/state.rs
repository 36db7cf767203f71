//! Implementations for the LaneCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::RgbImage;
use log::{debug, trace};
use serde::Serialize;
use std::time::Instant;

// Internal
use super::{
    Classification, LaneCtrlError, LastSeen, Params, PolyDetection, SteeringDecision,
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

/// Lane control module state
#[derive(Default)]
pub struct LaneCtrl {
    pub(crate) params: Params,

    pub(crate) lane_state: LaneState,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Segment classification of the last processed frame
    classification: Option<Classification>,

    /// Polynomial detection of the last processed frame, if the fallback ran
    poly_detection: Option<PolyDetection>,
}

/// Lane tracking state carried from one frame to the next.
#[derive(Debug, Clone, Default)]
pub struct LaneState {
    /// Which boundaries were visible in the most recent frame where any were
    pub last_seen: LastSeen,

    /// Start of the current run of frames with no boundary visible
    pub lost_since: Option<Instant>,

    /// Offset of the lane centre from the image centre, from the most recent
    /// frame where it could be measured.
    ///
    /// Units: pixels, positive to the right
    pub delta_px: i32,

    pub have_left: bool,
    pub have_right: bool,
}

/// Status report for LaneCtrl processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub decision: SteeringDecision,
    pub delta_px: i32,
    pub have_left: bool,
    pub have_right: bool,
    pub last_seen: LastSeen,

    /// Number of segments found by the Hough transform
    pub num_segments: usize,

    /// True if the polynomial path made the decision
    pub poly_fallback: bool,

    /// How long no boundary has been visible for, if none is
    ///
    /// Units: seconds
    pub lost_for_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LaneCtrl {
    type InitData = &'static str;
    type InitError = LaneCtrlError;

    type InputData = RgbImage;
    type OutputData = SteeringDecision;
    type StatusReport = StatusReport;
    type ProcError = LaneCtrlError;

    /// Initialise the LaneCtrl module.
    ///
    /// Expected init data is the name of the parameter file. Any lane state
    /// from a previous run is discarded.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        *self = Self::new(params::load(init_data)?);

        let mut arch_path = session.arch_root.clone();
        arch_path.push("lane_ctrl");
        std::fs::create_dir_all(arch_path).map_err(ArchiveError::FileError)?;

        self.arch_report = Archiver::from_path(session, "lane_ctrl/status_report.csv")?;

        Ok(())
    }

    /// Perform cyclic processing of Lane Control on one frame.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.process(input_data)
    }
}

impl Archived for LaneCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl LaneCtrl {
    /// Create a new lane controller with no lane history and no archive.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Decide how to steer for one frame.
    ///
    /// The segment path runs first. If it found fewer segments than
    /// `poly_fallback_max_segments` and decided to go straight, the
    /// polynomial path is given the final say.
    pub fn process(
        &mut self,
        frame: &RgbImage,
    ) -> Result<(SteeringDecision, StatusReport), LaneCtrlError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(LaneCtrlError::EmptyFrame { width, height });
        }

        self.report = StatusReport::default();

        let segments = self.extract_segments(frame);
        let classification = self.classify_segments(&segments, width, height);
        let mut decision = self.decide_from_segments(&classification, width, height);

        self.poly_detection = None;
        if segments.len() < self.params.poly_fallback_max_segments
            && decision == SteeringDecision::Straight
        {
            let detection = self.detect_lanes_polynomial(frame);
            decision = self.decide_from_polynomial(detection.as_ref());
            self.report.poly_fallback = true;
            self.poly_detection = detection;

            debug!("Polynomial fallback decided {:?}", decision);
        }

        self.classification = Some(classification);

        let state = &self.lane_state;
        self.report.decision = decision;
        self.report.delta_px = state.delta_px;
        self.report.have_left = state.have_left;
        self.report.have_right = state.have_right;
        self.report.last_seen = state.last_seen;
        self.report.num_segments = segments.len();
        self.report.lost_for_s = state.lost_since.map(|t| t.elapsed().as_secs_f64());

        trace!("LaneCtrl report: {:?}", self.report);

        Ok((decision, self.report))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The lane tracking state after the most recent decision.
    pub fn lane_state(&self) -> &LaneState {
        &self.lane_state
    }

    /// Segment classification of the last processed frame.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    /// Polynomial detection of the last processed frame, if one was run.
    pub fn poly_detection(&self) -> Option<&PolyDetection> {
        self.poly_detection.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{lane_frame, road_frame};

    fn ctrl() -> LaneCtrl {
        LaneCtrl::new(Params::default())
    }

    #[test]
    fn test_empty_frame_is_an_error() {
        assert!(matches!(
            ctrl().process(&RgbImage::new(0, 480)),
            Err(LaneCtrlError::EmptyFrame {
                width: 0,
                height: 480
            })
        ));
    }

    #[test]
    fn test_no_markings() {
        let mut lc = ctrl();

        let (decision, report) = lc.process(&road_frame()).unwrap();

        assert_eq!(decision, SteeringDecision::Straight);
        assert_eq!(report.num_segments, 0);
        assert!(report.poly_fallback);
        assert_eq!(report.last_seen, LastSeen::None);
        assert!(lc.poly_detection().is_none());
    }

    #[test]
    fn test_centred_lane() {
        let mut lc = ctrl();

        let (decision, report) = lc
            .process(&lane_frame(Some((160, 220)), Some((480, 420))))
            .unwrap();

        assert_eq!(decision, SteeringDecision::Straight);
        assert!(report.have_left && report.have_right);
        assert!(report.delta_px.abs() <= 15, "delta {}", report.delta_px);
        assert_eq!(report.last_seen, LastSeen::Both);
        assert_eq!(report.lost_for_s, None);
    }

    #[test]
    fn test_shifted_lane() {
        let mut lc = ctrl();

        let (decision, report) = lc
            .process(&lane_frame(Some((260, 320)), Some((580, 520))))
            .unwrap();

        assert!((report.delta_px - 100).abs() <= 15, "delta {}", report.delta_px);
        assert_eq!(decision, SteeringDecision::Right);
        assert!(!report.poly_fallback);
    }

    #[test]
    fn test_left_only_then_lost() {
        let mut lc = ctrl();

        let (decision, report) = lc.process(&lane_frame(Some((160, 220)), None)).unwrap();
        assert_eq!(decision, SteeringDecision::Right);
        assert!(report.have_left && !report.have_right);
        assert_eq!(report.last_seen, LastSeen::Left);

        // Repeated blank frames keep steering towards the last seen side
        for _ in 0..3 {
            let (decision, report) = lc.process(&road_frame()).unwrap();
            assert_eq!(decision, SteeringDecision::Left);
            assert_eq!(report.last_seen, LastSeen::Left);
            assert!(!report.poly_fallback);
            assert!(report.lost_for_s.is_some());
        }
    }

    #[test]
    fn test_deterministic() {
        let frame = lane_frame(Some((180, 230)), Some((500, 430)));

        let (d1, r1) = ctrl().process(&frame).unwrap();
        let (d2, r2) = ctrl().process(&frame).unwrap();

        assert_eq!(d1, d2);
        assert_eq!(r1.delta_px, r2.delta_px);
        assert_eq!(r1.num_segments, r2.num_segments);
    }

    /// A controller whose Hough stage never reaches its vote threshold, so
    /// every frame goes to the polynomial path.
    fn poly_only_ctrl() -> LaneCtrl {
        let mut params = Params::default();
        params.hough.threshold = 100_000;
        LaneCtrl::new(params)
    }

    #[test]
    fn test_polynomial_fallback_decides() {
        let mut lc = poly_only_ctrl();

        let (decision, report) = lc
            .process(&lane_frame(Some((260, 320)), Some((580, 520))))
            .unwrap();

        assert_eq!(report.num_segments, 0);
        assert!(report.poly_fallback);
        assert_eq!(decision, SteeringDecision::Right);
        assert!((report.delta_px - 100).abs() <= 15, "delta {}", report.delta_px);
        assert_eq!(report.last_seen, LastSeen::Both);
        assert!(lc.poly_detection().is_some());
    }

    #[test]
    fn test_polynomial_fallback_one_side_goes_straight() {
        let mut lc = poly_only_ctrl();

        let (decision, report) = lc.process(&lane_frame(Some((160, 220)), None)).unwrap();

        // No nudge away from the single boundary
        assert!(report.poly_fallback);
        assert_eq!(decision, SteeringDecision::Straight);
        assert!((report.delta_px + 10).abs() <= 15, "delta {}", report.delta_px);
        assert!(report.have_left && !report.have_right);
        assert_eq!(report.last_seen, LastSeen::Left);
    }
}
