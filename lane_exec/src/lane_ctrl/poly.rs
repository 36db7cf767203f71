//! Sliding window polynomial lane detection.
//!
//! Used when the markings are too sparse or broken for the segment path. The
//! base of each boundary is found from a column histogram of the bottom of
//! the lane mask, then a stack of windows follows each boundary up the image
//! and a quadratic `x = a*y^2 + b*y + c` is fitted to the pixels collected.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{GrayImage, RgbImage};
use log::trace;
use serde::Serialize;
use util::maths::{poly_val, polyfit2};

use super::LaneCtrl;
use crate::vision;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A quadratic boundary `x = a*y^2 + b*y + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolyFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Result of the polynomial detection on one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolyDetection {
    /// Fit of the left boundary, if enough pixels were collected
    pub left: Option<PolyFit>,

    /// Fit of the right boundary, if enough pixels were collected
    pub right: Option<PolyFit>,

    /// Histogram peak in the left half of the image
    pub left_base: Option<u32>,

    /// Histogram peak in the right half of the image
    pub right_base: Option<u32>,

    pub height: u32,
    pub width: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PolyFit {
    /// The `x` coordinate of the boundary at row `y`.
    pub fn x_at(&self, y: f64) -> f64 {
        poly_val(y, &[self.a, self.b, self.c])
    }
}

impl LaneCtrl {
    /// Binary mask of lane coloured pixels, blurred and re-binarised.
    pub fn lane_mask(&self, frame: &RgbImage) -> GrayImage {
        let mask = vision::in_range_mask(frame, &self.params.lane_colour);
        let mut mask = vision::blur(&mask, self.params.blur_sigma);
        vision::binarise(&mut mask, 0);
        mask
    }

    /// Detect the lane boundaries with sliding windows.
    ///
    /// Returns `None` if neither half of the histogram has any lane pixels.
    pub fn detect_lanes_polynomial(&self, frame: &RgbImage) -> Option<PolyDetection> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let mask = self.lane_mask(frame);

        // Column histogram over the bottom of the image
        let hist_top = vision::roi_top_row(height, 1.0 - self.params.poly_hist_frac);
        let mut histogram = vec![0u32; width as usize];
        for y in hist_top..height {
            for (x, count) in histogram.iter_mut().enumerate() {
                if mask.get_pixel(x as u32, y).0[0] > 0 {
                    *count += 1;
                }
            }
        }

        let midpoint = (width / 2) as usize;
        let left_base = argmax_nonzero(&histogram[..midpoint]);
        let right_base = argmax_nonzero(&histogram[midpoint..]).map(|x| x + midpoint as u32);

        if left_base.is_none() && right_base.is_none() {
            return None;
        }

        let left = left_base.and_then(|b| self.sliding_window_fit(&mask, b));
        let right = right_base.and_then(|b| self.sliding_window_fit(&mask, b));

        trace!(
            "Polynomial detection: bases {:?}/{:?}, fits {:?}/{:?}",
            left_base,
            right_base,
            left,
            right
        );

        Some(PolyDetection {
            left,
            right,
            left_base,
            right_base,
            height,
            width,
        })
    }

    /// Follow one boundary up the mask from `base_x` and fit it.
    fn sliding_window_fit(&self, mask: &GrayImage, base_x: u32) -> Option<PolyFit> {
        let (width, height) = mask.dimensions();
        let num_windows = self.params.poly_num_windows.max(1);
        let window_height = (height / num_windows).max(1) as i64;
        let margin = self.params.poly_margin_px as i64;

        let mut current_x = base_x as i64;
        let mut xs = vec![];
        let mut ys = vec![];

        for window in 0..num_windows as i64 {
            let y_high = height as i64 - window * window_height;
            let y_low = (y_high - window_height).max(0);
            if y_high <= 0 {
                break;
            }

            let x_low = (current_x - margin).max(0);
            let x_high = (current_x + margin).min(width as i64);

            let first = xs.len();
            for y in y_low..y_high {
                for x in x_low..x_high {
                    if mask.get_pixel(x as u32, y as u32).0[0] > 0 {
                        xs.push(x as f64);
                        ys.push(y as f64);
                    }
                }
            }

            let found = &xs[first..];
            if found.len() > self.params.poly_min_pix {
                if let Some(m) = util::maths::mean(found) {
                    current_x = m.round() as i64;
                }
            }
        }

        if xs.len() <= self.params.poly_min_total_pix {
            return None;
        }

        polyfit2(&ys, &xs).map(|[a, b, c]| PolyFit { a, b, c })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Index of the first maximum, or `None` if every entry is zero.
fn argmax_nonzero(values: &[u32]) -> Option<u32> {
    let mut best: Option<(usize, u32)> = None;

    for (i, &v) in values.iter().enumerate() {
        if v > best.map_or(0, |(_, b)| b) {
            best = Some((i, v));
        }
    }

    best.map(|(i, _)| i as u32)
}
