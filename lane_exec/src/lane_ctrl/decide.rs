//! Steering decisions from boundary positions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use std::time::Instant;

use super::{Classification, LaneCtrl, LastSeen, PolyDetection, SteeringDecision};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the lane centre was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CentreSource {
    /// Both boundaries seen
    Both,

    /// Only the left boundary seen, the right one placed a lane width away
    LeftOnly,

    /// Only the right boundary seen, the left one placed a lane width away
    RightOnly,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneCtrl {
    /// Decide how to steer from the classified segments.
    ///
    /// Boundaries are evaluated at the bottom row of the image. With only one
    /// boundary visible the car is nudged away from it unless it is already
    /// well off centre towards the other side. With neither visible the side
    /// the lane was last seen on is steered towards.
    pub fn decide_from_segments(
        &mut self,
        classification: &Classification,
        width: u32,
        height: u32,
    ) -> SteeringDecision {
        let y_eval = height as f64 - 1.0;
        let left_x = classification.left.and_then(|f| f.x_at(y_eval));
        let right_x = classification.right.and_then(|f| f.x_at(y_eval));

        let (centre, source) = match self.lane_centre(left_x, right_x) {
            Some(c) => c,
            None => return self.recover(),
        };

        let delta_px = self.record_sighting(centre, width, left_x.is_some(), right_x.is_some());
        let deadband = self.params.center_deadband_px;

        match source {
            CentreSource::Both => self.deadband_decision(delta_px),
            CentreSource::LeftOnly => {
                if (delta_px as f64) < -deadband {
                    SteeringDecision::Left
                } else {
                    SteeringDecision::Right
                }
            }
            CentreSource::RightOnly => {
                if (delta_px as f64) > deadband {
                    SteeringDecision::Right
                } else {
                    SteeringDecision::Left
                }
            }
        }
    }

    /// Decide how to steer from a polynomial detection.
    ///
    /// Unlike the segment path a single boundary doesn't nudge, and finding
    /// nothing gives `Straight` without touching the recovery state.
    pub fn decide_from_polynomial(&mut self, detection: Option<&PolyDetection>) -> SteeringDecision {
        let det = match detection {
            Some(d) => d,
            None => return SteeringDecision::Straight,
        };

        let y_eval = det.height as f64 - 1.0;
        let left_x = det.left.map(|f| f.x_at(y_eval));
        let right_x = det.right.map(|f| f.x_at(y_eval));

        match self.lane_centre(left_x, right_x) {
            Some((centre, _)) => {
                let delta_px =
                    self.record_sighting(centre, det.width, left_x.is_some(), right_x.is_some());
                self.deadband_decision(delta_px)
            }
            None => SteeringDecision::Straight,
        }
    }

    /// Lane centre from whichever boundaries are present.
    fn lane_centre(
        &self,
        left_x: Option<f64>,
        right_x: Option<f64>,
    ) -> Option<(f64, CentreSource)> {
        let lane_width = self.params.lane_width_px;

        match (left_x, right_x) {
            (Some(l), Some(r)) => Some(((l + r) / 2.0, CentreSource::Both)),
            (Some(l), None) => Some(((2.0 * l + lane_width) / 2.0, CentreSource::LeftOnly)),
            (None, Some(r)) => Some(((2.0 * r - lane_width) / 2.0, CentreSource::RightOnly)),
            (None, None) => None,
        }
    }

    fn deadband_decision(&self, delta_px: i32) -> SteeringDecision {
        let deadband = self.params.center_deadband_px;

        if (delta_px as f64) < -deadband {
            SteeringDecision::Left
        } else if (delta_px as f64) > deadband {
            SteeringDecision::Right
        } else {
            SteeringDecision::Straight
        }
    }

    /// Update the lane state after at least one boundary was found, returning
    /// the rounded offset of the lane centre from the image centre.
    fn record_sighting(&mut self, centre: f64, width: u32, have_left: bool, have_right: bool) -> i32 {
        let delta_px = (centre - width as f64 / 2.0).round() as i32;

        let state = &mut self.lane_state;
        state.delta_px = delta_px;
        state.have_left = have_left;
        state.have_right = have_right;
        state.last_seen = LastSeen::from_sides(have_left, have_right);
        state.lost_since = None;

        delta_px
    }

    /// Steer towards the side the lane was last seen on.
    fn recover(&mut self) -> SteeringDecision {
        let state = &mut self.lane_state;
        state.have_left = false;
        state.have_right = false;
        if state.lost_since.is_none() {
            debug!("Lane lost, last seen {:?}", state.last_seen);
            state.lost_since = Some(Instant::now());
        }

        match state.last_seen {
            LastSeen::Left => SteeringDecision::Left,
            LastSeen::Right => SteeringDecision::Right,
            LastSeen::Both | LastSeen::None => SteeringDecision::Straight,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lane_ctrl::{LineFit, Params, PolyFit};

    const W: u32 = 640;
    const H: u32 = 480;

    /// A fit whose line crosses the bottom row at `x` with the given slope.
    fn fit_through(x: f64, slope: f64) -> LineFit {
        LineFit {
            slope,
            intercept: (H as f64 - 1.0) - slope * x,
        }
    }

    fn classification(left: Option<f64>, right: Option<f64>) -> Classification {
        Classification {
            left: left.map(|x| fit_through(x, -3.2)),
            right: right.map(|x| fit_through(x, 3.2)),
            num_left: left.is_some() as usize,
            num_right: right.is_some() as usize,
        }
    }

    fn ctrl() -> LaneCtrl {
        LaneCtrl::new(Params::default())
    }

    #[test]
    fn test_both_sides() {
        let mut lc = ctrl();

        assert_eq!(
            lc.decide_from_segments(&classification(Some(170.0), Some(470.0)), W, H),
            SteeringDecision::Straight
        );
        assert_eq!(lc.lane_state().delta_px, 0);
        assert_eq!(lc.lane_state().last_seen, LastSeen::Both);

        assert_eq!(
            lc.decide_from_segments(&classification(Some(270.0), Some(570.0)), W, H),
            SteeringDecision::Right
        );
        assert_eq!(lc.lane_state().delta_px, 100);

        assert_eq!(
            lc.decide_from_segments(&classification(Some(70.0), Some(370.0)), W, H),
            SteeringDecision::Left
        );
        assert_eq!(lc.lane_state().delta_px, -100);

        // Exactly on the deadband edge
        lc.decide_from_segments(&classification(Some(210.0), Some(510.0)), W, H);
        assert_eq!(lc.lane_state().delta_px, 40);
        assert_eq!(
            lc.decide_from_segments(&classification(Some(210.0), Some(510.0)), W, H),
            SteeringDecision::Straight
        );
    }

    #[test]
    fn test_left_only_nudges_right() {
        let mut lc = ctrl();

        // Centre at 160 + 150 = 310, delta -10
        assert_eq!(
            lc.decide_from_segments(&classification(Some(160.0), None), W, H),
            SteeringDecision::Right
        );
        assert_eq!(lc.lane_state().delta_px, -10);
        assert_eq!(lc.lane_state().last_seen, LastSeen::Left);
        assert!(lc.lane_state().have_left && !lc.lane_state().have_right);

        // Centre at 100, well left of the deadband
        assert_eq!(
            lc.decide_from_segments(&classification(Some(-50.0), None), W, H),
            SteeringDecision::Left
        );
    }

    #[test]
    fn test_right_only_nudges_left() {
        let mut lc = ctrl();

        assert_eq!(
            lc.decide_from_segments(&classification(None, Some(480.0)), W, H),
            SteeringDecision::Left
        );
        assert_eq!(lc.lane_state().delta_px, 10);
        assert_eq!(lc.lane_state().last_seen, LastSeen::Right);

        assert_eq!(
            lc.decide_from_segments(&classification(None, Some(700.0)), W, H),
            SteeringDecision::Right
        );
    }

    #[test]
    fn test_recovery_is_sticky() {
        let mut lc = ctrl();

        // Nothing ever seen
        assert_eq!(
            lc.decide_from_segments(&Classification::default(), W, H),
            SteeringDecision::Straight
        );
        assert_eq!(lc.lane_state().last_seen, LastSeen::None);

        lc.decide_from_segments(&classification(None, Some(480.0)), W, H);
        assert!(lc.lane_state().lost_since.is_none());

        for _ in 0..3 {
            assert_eq!(
                lc.decide_from_segments(&Classification::default(), W, H),
                SteeringDecision::Right
            );
        }
        let state = lc.lane_state();
        assert_eq!(state.last_seen, LastSeen::Right);
        assert!(state.lost_since.is_some());
        assert!(!state.have_left && !state.have_right);
        // The last measured offset is kept while lost
        assert_eq!(state.delta_px, 10);

        // Seeing a boundary again ends the streak
        lc.decide_from_segments(&classification(Some(170.0), Some(470.0)), W, H);
        assert!(lc.lane_state().lost_since.is_none());
        assert_eq!(
            lc.decide_from_segments(&Classification::default(), W, H),
            SteeringDecision::Straight
        );
    }

    #[test]
    fn test_flat_fit_is_absent() {
        let mut lc = ctrl();
        let c = Classification {
            left: Some(LineFit {
                slope: 0.0,
                intercept: 400.0,
            }),
            right: Some(fit_through(480.0, 3.2)),
            num_left: 1,
            num_right: 1,
        };

        // Behaves as right only
        assert_eq!(lc.decide_from_segments(&c, W, H), SteeringDecision::Left);
        assert!(!lc.lane_state().have_left);
    }

    #[test]
    fn test_polynomial_decisions() {
        let mut lc = ctrl();
        let vertical = |c: f64| PolyFit { a: 0.0, b: 0.0, c };

        assert_eq!(lc.decide_from_polynomial(None), SteeringDecision::Straight);

        let mut det = PolyDetection {
            left: Some(vertical(270.0)),
            right: Some(vertical(570.0)),
            left_base: Some(270),
            right_base: Some(570),
            height: H,
            width: W,
        };
        assert_eq!(lc.decide_from_polynomial(Some(&det)), SteeringDecision::Right);
        assert_eq!(lc.lane_state().delta_px, 100);

        // One side only falls through to straight rather than nudging
        det.right = None;
        det.left = Some(vertical(160.0));
        assert_eq!(lc.decide_from_polynomial(Some(&det)), SteeringDecision::Straight);
        assert_eq!(lc.lane_state().last_seen, LastSeen::Left);

        // Nothing fitted leaves the state alone
        det.left = None;
        assert_eq!(lc.decide_from_polynomial(Some(&det)), SteeringDecision::Straight);
        assert_eq!(lc.lane_state().last_seen, LastSeen::Left);
        assert!(lc.lane_state().lost_since.is_none());
    }
}
