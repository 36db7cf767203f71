//! # Lane overlay
//!
//! Renders the detected lane on top of a camera frame for the saved
//! annotated frames.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut},
    point::Point,
};

use util::maths::clamp;

use crate::lane_ctrl::{Classification, LineFit, PolyDetection, PolyFit};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const LANE_FILL: Rgb<u8> = Rgb([0, 255, 0]);
const BOUNDARY: Rgb<u8> = Rgb([0, 200, 0]);
const LANE_CENTRE: Rgb<u8> = Rgb([0, 120, 0]);
const IMAGE_CENTRE: Rgb<u8> = Rgb([0, 0, 255]);

/// Weight of the drawing in the blended output, the frame gets the rest.
const OVERLAY_WEIGHT: f32 = 0.6;

const BOUNDARY_THICKNESS: i32 = 6;
const CENTRE_DOT_RADIUS: i32 = 6;

/// Row spacing of the samples along a curved boundary.
const CURVE_STEP_PX: usize = 8;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Draw the detected lane over the frame.
///
/// The lane is drawn from `band_top_frac * H` down to the bottom row. When the
/// polynomial fallback ran and fitted both boundaries its curves are drawn,
/// otherwise the classified segment boundaries are used if both sides were
/// found. With neither the frame is returned unchanged.
pub fn draw_lane_overlay(
    frame: &RgbImage,
    classification: Option<&Classification>,
    poly_detection: Option<&PolyDetection>,
    band_top_frac: f64,
) -> RgbImage {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return frame.clone();
    }

    let y_top = (height as f64 * band_top_frac) as i32;
    let y_bot = height as i32 - 1;
    let limit = 4 * width as i32;

    let boundaries = match (poly_detection, classification) {
        (
            Some(PolyDetection {
                left: Some(l),
                right: Some(r),
                ..
            }),
            _,
        ) => Some((
            curve_points(l, y_top, y_bot, limit),
            curve_points(r, y_top, y_bot, limit),
        )),
        (
            _,
            Some(Classification {
                left: Some(l),
                right: Some(r),
                ..
            }),
        ) => match (
            boundary_points(l, y_top, y_bot, limit),
            boundary_points(r, y_top, y_bot, limit),
        ) {
            (Some(lp), Some(rp)) => Some((lp, rp)),
            _ => None,
        },
        _ => None,
    };

    let (left_pts, right_pts) = match boundaries {
        Some(b) => b,
        None => return frame.clone(),
    };

    let mut overlay = frame.clone();

    // Left boundary top to bottom then right boundary bottom to top. The
    // polygon must not be closed explicitly.
    let polygon: Vec<Point<i32>> = left_pts
        .iter()
        .chain(right_pts.iter().rev())
        .copied()
        .collect();
    if left_pts[0] != right_pts[0] {
        draw_polygon_mut(&mut overlay, &polygon, LANE_FILL);
    }

    for pts in [&left_pts, &right_pts].iter() {
        for pair in pts.windows(2) {
            draw_thick_line(&mut overlay, pair[0], pair[1], BOUNDARY);
        }
    }

    let l_bot = left_pts[left_pts.len() - 1];
    let r_bot = right_pts[right_pts.len() - 1];
    let centre_x = (l_bot.x + r_bot.x) / 2;
    draw_filled_circle_mut(&mut overlay, (centre_x, y_bot), CENTRE_DOT_RADIUS, LANE_CENTRE);

    let mid = (width / 2) as f32;
    draw_line_segment_mut(
        &mut overlay,
        (mid, y_bot as f32),
        (mid, y_top as f32),
        IMAGE_CENTRE,
    );

    blend(&overlay, frame, OVERLAY_WEIGHT)
}

/// Blend two images of equal size, `weight` applying to `top`.
pub fn blend(top: &RgbImage, bottom: &RgbImage, weight: f32) -> RgbImage {
    let mut out = bottom.clone();

    for (o, t) in out.pixels_mut().zip(top.pixels()) {
        for c in 0..3 {
            let v = weight * t.0[c] as f32 + (1.0 - weight) * o.0[c] as f32;
            o.0[c] = clamp(v.round(), 0.0, 255.0) as u8;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Column clamped to `[-limit, limit]`, keeping far off-screen points
/// drawable.
fn clamp_col(x: f64, limit: i32) -> i32 {
    clamp(x, -limit as f64, limit as f64) as i32
}

/// Points where a straight boundary crosses the top and bottom rows of the
/// band.
fn boundary_points(fit: &LineFit, y_top: i32, y_bot: i32, limit: i32) -> Option<Vec<Point<i32>>> {
    let x_top = fit.x_at(y_top as f64)?;
    let x_bot = fit.x_at(y_bot as f64)?;

    Some(vec![
        Point::new(clamp_col(x_top, limit), y_top),
        Point::new(clamp_col(x_bot, limit), y_bot),
    ])
}

/// Samples of a curved boundary from the top row of the band to the bottom
/// row.
fn curve_points(fit: &PolyFit, y_top: i32, y_bot: i32, limit: i32) -> Vec<Point<i32>> {
    let mut ys: Vec<i32> = (y_top..y_bot).step_by(CURVE_STEP_PX).collect();
    ys.push(y_bot);

    ys.into_iter()
        .map(|y| Point::new(clamp_col(fit.x_at(y as f64), limit), y))
        .collect()
}

fn draw_thick_line(img: &mut RgbImage, a: Point<i32>, b: Point<i32>, colour: Rgb<u8>) {
    let half = BOUNDARY_THICKNESS / 2;

    for offset in -half..=half {
        draw_line_segment_mut(
            img,
            ((a.x + offset) as f32, a.y as f32),
            ((b.x + offset) as f32, b.y as f32),
            colour,
        );
    }
}
