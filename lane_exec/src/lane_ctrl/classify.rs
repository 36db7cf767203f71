//! Classification of line segments into left and right lane boundaries.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::mean;

use super::{LaneCtrl, LineSegment, FLAT_SLOPE_EPS, VERTICAL_SLOPE};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight line `y = slope * x + intercept` in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

/// Averaged boundary fits for each side of the lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Classification {
    /// Mean fit of the segments assigned to the left boundary
    pub left: Option<LineFit>,

    /// Mean fit of the segments assigned to the right boundary
    pub right: Option<LineFit>,

    pub num_left: usize,
    pub num_right: usize,
}

/// Which boundary a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineFit {
    /// Line through both endpoints of the segment.
    pub fn from_segment(seg: &LineSegment) -> Self {
        let dx = (seg.x2 - seg.x1) as f64;
        let slope = if dx == 0.0 {
            VERTICAL_SLOPE
        } else {
            (seg.y2 - seg.y1) as f64 / dx
        };

        Self {
            slope,
            intercept: seg.y1 as f64 - slope * seg.x1 as f64,
        }
    }

    /// The `x` coordinate of the line at row `y`, or `None` if the line is
    /// too close to horizontal to be evaluated.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        if self.slope.abs() <= FLAT_SLOPE_EPS {
            None
        } else {
            Some((y - self.intercept) / self.slope)
        }
    }
}

impl LaneCtrl {
    /// Split segments into left and right boundaries and average each side.
    ///
    /// Segments lying wholly above the classification band are dropped. Steep
    /// segments are assigned by the sign of their slope (negative slopes lean
    /// towards the image centre from the left), near horizontal ones by which
    /// half of the image they reach at the bottom row. Segments whose slope
    /// magnitude equals the threshold exactly are ambiguous and dropped.
    pub fn classify_segments(
        &self,
        segments: &[LineSegment],
        width: u32,
        height: u32,
    ) -> Classification {
        let band_top = height as f64 * self.params.band_top_frac;
        let y_bottom = height as f64 - 1.0;
        let x_centre = width as f64 / 2.0;
        let thresh = self.params.slope_threshold;

        let mut left = vec![];
        let mut right = vec![];

        for seg in segments {
            if (seg.y1.max(seg.y2) as f64) < band_top {
                continue;
            }

            let fit = LineFit::from_segment(seg);
            let m = fit.slope;

            let side = if m.abs() < thresh {
                let x = fit
                    .x_at(y_bottom)
                    .unwrap_or_else(|| (seg.x1 + seg.x2) as f64 / 2.0);
                if x < x_centre {
                    Some(Side::Left)
                } else {
                    Some(Side::Right)
                }
            } else if m < -thresh {
                Some(Side::Left)
            } else if m > thresh {
                Some(Side::Right)
            } else {
                None
            };

            match side {
                Some(Side::Left) => left.push(fit),
                Some(Side::Right) => right.push(fit),
                None => (),
            }
        }

        Classification {
            left: mean_fit(&left),
            right: mean_fit(&right),
            num_left: left.len(),
            num_right: right.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Component-wise mean of the fits.
fn mean_fit(fits: &[LineFit]) -> Option<LineFit> {
    let slopes: Vec<f64> = fits.iter().map(|f| f.slope).collect();
    let intercepts: Vec<f64> = fits.iter().map(|f| f.intercept).collect();

    Some(LineFit {
        slope: mean(&slopes)?,
        intercept: mean(&intercepts)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lane_ctrl::Params;

    const W: u32 = 640;
    const H: u32 = 480;

    fn classify(segments: &[LineSegment]) -> Classification {
        LaneCtrl::new(Params::default()).classify_segments(segments, W, H)
    }

    #[test]
    fn test_line_fit() {
        let v = LineFit::from_segment(&LineSegment::new(100, 300, 100, 470));
        assert_eq!(v.slope, VERTICAL_SLOPE);
        assert!((v.x_at(479.0).unwrap() - 100.0).abs() < 1e-3);

        let flat = LineFit::from_segment(&LineSegment::new(10, 400, 90, 400));
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.x_at(479.0), None);
    }

    #[test]
    fn test_steep_segments_by_slope() {
        let c = classify(&[
            LineSegment::new(160, 479, 220, 288),
            LineSegment::new(162, 470, 218, 300),
            LineSegment::new(480, 479, 420, 288),
        ]);

        assert_eq!((c.num_left, c.num_right), (2, 1));
        assert!(c.left.unwrap().slope < -3.0);
        assert!(c.right.unwrap().slope > 3.0);
    }

    #[test]
    fn test_band_and_ambiguous_slope() {
        let c = classify(&[
            // Entirely above the band at 0.6 * 480 = 288
            LineSegment::new(100, 100, 150, 250),
            // Slope exactly 0.2
            LineSegment::new(100, 400, 200, 420),
            // Slope exactly -0.2
            LineSegment::new(100, 420, 200, 400),
        ]);

        assert_eq!(c, Classification::default());
    }

    #[test]
    fn test_shallow_segments_by_position() {
        let c = classify(&[
            // Perfectly flat, falls back to the mid point
            LineSegment::new(50, 450, 150, 450),
            // Shallow, reaches the bottom row right of centre
            LineSegment::new(400, 440, 500, 450),
        ]);

        assert_eq!((c.num_left, c.num_right), (1, 1));
        assert_eq!(c.left.unwrap().slope, 0.0);
    }
}
