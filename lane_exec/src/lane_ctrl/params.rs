//! Parameters structure for LaneCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::vision::{HoughParams, HsvRange};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Lane control.
///
/// Missing entries in the parameter file take their default value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- LANE GEOMETRY ----
    /// Assumed distance between the two lane boundaries at the bottom of the
    /// image, used to place a missing boundary.
    ///
    /// Units: pixels
    pub lane_width_px: f64,

    /// Lane centre offsets within +/- this value are treated as centred.
    ///
    /// Units: pixels
    pub center_deadband_px: f64,

    // ---- SEGMENT EXTRACTION ----
    /// Colour of the lane markings.
    pub lane_colour: HsvRange,

    /// Standard deviation of the blur applied to the colour mask.
    pub blur_sigma: f32,

    /// Canny hysteresis thresholds
    pub canny_low_threshold: f32,
    pub canny_high_threshold: f32,

    /// Dilate the edge image with a 3x3 kernel before the Hough transform.
    pub dilate_edges: bool,

    /// Top of the region of interest as a fraction of the image height.
    pub roi_top_frac: f64,

    pub hough: HoughParams,

    // ---- CLASSIFICATION ----
    /// Segments entirely above this fraction of the image height are ignored.
    pub band_top_frac: f64,

    /// Slope magnitude separating steep boundary segments from near
    /// horizontal ones.
    pub slope_threshold: f64,

    // ---- POLYNOMIAL FALLBACK ----
    /// The polynomial path runs when the segment path found fewer segments
    /// than this and decided to go straight.
    pub poly_fallback_max_segments: usize,

    /// Fraction of the image, from the bottom, used for the base histogram.
    pub poly_hist_frac: f64,

    pub poly_num_windows: u32,

    /// Half width of each sliding window.
    ///
    /// Units: pixels
    pub poly_margin_px: u32,

    /// A window holding more than this many pixels recentres the search.
    pub poly_min_pix: usize,

    /// A side needs more than this many pixels in total to be fitted.
    pub poly_min_total_pix: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            lane_width_px: 300.0,
            center_deadband_px: 40.0,
            lane_colour: HsvRange {
                low: [0, 0, 150],
                high: [180, 60, 255],
            },
            blur_sigma: 1.1,
            canny_low_threshold: 50.0,
            canny_high_threshold: 150.0,
            dilate_edges: true,
            roi_top_frac: 0.5,
            hough: HoughParams::default(),
            band_top_frac: 0.6,
            slope_threshold: 0.2,
            poly_fallback_max_segments: 4,
            poly_hist_frac: 0.4,
            poly_num_windows: 9,
            poly_margin_px: 50,
            poly_min_pix: 30,
            poly_min_total_pix: 200,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_params_file() {
        let p: Params = util::params::from_str(
            r#"
            lane_width_px = 320.0
            dilate_edges = false

            [hough]
            threshold = 40
            "#,
        )
        .unwrap();

        assert_eq!(p.lane_width_px, 320.0);
        assert!(!p.dilate_edges);
        assert_eq!(p.hough.threshold, 40);
        assert_eq!(p.hough.max_line_gap_px, 100);
        assert_eq!(p.center_deadband_px, 40.0);
        assert_eq!(p.lane_colour.high, [180, 60, 255]);
    }
}
