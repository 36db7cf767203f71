//! Line segment extraction from a camera frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::RgbImage;
use log::trace;

use super::{LaneCtrl, LineSegment};
use crate::vision;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneCtrl {
    /// Extract candidate lane marking segments from the frame.
    ///
    /// The frame is thresholded to lane coloured pixels, smoothed, edge
    /// detected, restricted to the bottom of the image and passed through the
    /// probabilistic Hough transform.
    pub fn extract_segments(&self, frame: &RgbImage) -> Vec<LineSegment> {
        let p = &self.params;

        let mask = vision::in_range_mask(frame, &p.lane_colour);
        let blurred = vision::blur(&mask, p.blur_sigma);

        let mut edges = vision::canny(&blurred, p.canny_low_threshold, p.canny_high_threshold);
        if p.dilate_edges {
            edges = vision::dilate_3x3(&edges);
        }

        vision::mask_to_bottom(&mut edges, p.roi_top_frac);

        let segments = vision::hough_lines_p(&edges, &p.hough);
        trace!("Extracted {} segments", segments.len());

        segments
    }
}
