//! Probabilistic Hough transform for line segments.
//!
//! Edge points are visited in a random (but seeded, so reproducible) order.
//! Each point votes into a rho/theta accumulator; as soon as a bin passes the
//! threshold the corresponding line is walked through the edge image in both
//! directions, bridging gaps up to `max_line_gap`, to find the segment's
//! endpoints. Points on the walked segment are removed from further voting.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::GrayImage;
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fixed point shift used when stepping along the minor axis of a line.
const SHIFT: i32 = 16;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A line segment in pixel coordinates, `y` increasing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Parameters of the probabilistic Hough transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Distance resolution of the accumulator.
    ///
    /// Units: pixels
    pub rho_px: f64,

    /// Angle resolution of the accumulator.
    ///
    /// Units: degrees
    pub theta_deg: f64,

    /// Minimum number of votes for a line to be considered.
    pub threshold: u32,

    /// Minimum segment extent along either axis.
    ///
    /// Units: pixels
    pub min_line_length_px: u32,

    /// Largest gap between edge points bridged within one segment.
    ///
    /// Units: pixels
    pub max_line_gap_px: u32,

    /// Seed for the point visiting order
    pub seed: u64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho_px: 1.0,
            theta_deg: 1.0,
            threshold: 50,
            min_line_length_px: 40,
            max_line_gap_px: 100,
            seed: 0x5eed,
        }
    }
}

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        (((self.x2 - self.x1) as f64).powi(2) + ((self.y2 - self.y1) as f64).powi(2)).sqrt()
    }
}

/// Walks a line through the image from a seed point in one direction.
#[derive(Clone, Copy)]
struct LineWalker {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    x_major: bool,
}

impl LineWalker {
    /// Current pixel position as `(col, row)`.
    fn pixel(&self) -> (i32, i32) {
        if self.x_major {
            (self.x, self.y >> SHIFT)
        } else {
            (self.x >> SHIFT, self.y)
        }
    }

    fn step(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Find line segments in a binary edge image.
///
/// Any non-zero pixel is an edge point. The segments are returned in the
/// order they were found, which carries no meaning.
pub fn hough_lines_p(edges: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
    let width = edges.width() as i32;
    let height = edges.height() as i32;
    if width == 0 || height == 0 || params.rho_px <= 0.0 || params.theta_deg <= 0.0 {
        return vec![];
    }

    let theta = params.theta_deg.to_radians();
    let irho = 1.0 / params.rho_px;
    let num_angle = ((std::f64::consts::PI / theta).round() as usize).max(1);
    let num_rho = (((width + height) * 2 + 1) as f64 / params.rho_px).round() as usize;
    let rho_offset = (num_rho as i32 - 1) / 2;

    let trig: Vec<(f64, f64)> = (0..num_angle)
        .map(|n| {
            let ang = n as f64 * theta;
            (ang.cos() * irho, ang.sin() * irho)
        })
        .collect();

    let rho_bin = |n: usize, col: i32, row: i32| -> usize {
        let (c, s) = trig[n];
        let r = (col as f64 * c + row as f64 * s).round() as i32 + rho_offset;
        r.max(0).min(num_rho as i32 - 1) as usize
    };

    let mut accum = vec![0u32; num_angle * num_rho];
    let mut mask = vec![false; (width * height) as usize];
    let mut points = Vec::new();

    for (x, y, px) in edges.enumerate_pixels() {
        if px.0[0] != 0 {
            mask[(y as i32 * width + x as i32) as usize] = true;
            points.push((x as i32, y as i32));
        }
    }

    let mut rng = SmallRng::seed_from_u64(params.seed);
    points.shuffle(&mut rng);

    let max_gap = params.max_line_gap_px as i32;
    let min_len = params.min_line_length_px as i32;
    let mut segments = Vec::new();

    for &(col, row) in points.iter() {
        // Points consumed by a previous line no longer vote
        if !mask[(row * width + col) as usize] {
            continue;
        }

        let mut max_val = params.threshold.saturating_sub(1);
        let mut max_n = 0;
        for n in 0..num_angle {
            let bin = &mut accum[n * num_rho + rho_bin(n, col, row)];
            *bin += 1;
            if *bin > max_val {
                max_val = *bin;
                max_n = n;
            }
        }

        if max_val < params.threshold {
            continue;
        }

        // Direction along the line for the winning angle
        let (cos_t, sin_t) = trig[max_n];
        let (a, b) = (-sin_t, cos_t);

        let seed = if a.abs() > b.abs() {
            LineWalker {
                x: col,
                y: (row << SHIFT) + (1 << (SHIFT - 1)),
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * (1 << SHIFT) as f64 / a.abs()).round() as i32,
                x_major: true,
            }
        } else {
            LineWalker {
                x: (col << SHIFT) + (1 << (SHIFT - 1)),
                y: row,
                dx: (a * (1 << SHIFT) as f64 / b.abs()).round() as i32,
                dy: if b > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        };

        let walker = |k: usize| {
            let sign = if k == 0 { 1 } else { -1 };
            LineWalker {
                dx: seed.dx * sign,
                dy: seed.dy * sign,
                ..seed
            }
        };

        // Find the end points in both directions
        let mut line_end = [(col, row); 2];
        for (k, end) in line_end.iter_mut().enumerate() {
            let mut w = walker(k);
            let mut gap = 0;
            loop {
                let (j, i) = w.pixel();
                if j < 0 || j >= width || i < 0 || i >= height {
                    break;
                }
                if mask[(i * width + j) as usize] {
                    gap = 0;
                    *end = (j, i);
                } else {
                    gap += 1;
                    if gap > max_gap {
                        break;
                    }
                }
                w.step();
            }
        }

        let good_line = (line_end[1].0 - line_end[0].0).abs() >= min_len
            || (line_end[1].1 - line_end[0].1).abs() >= min_len;

        // Remove the walked points, returning their votes if the line is kept
        for (k, end) in line_end.iter().enumerate() {
            let mut w = walker(k);
            loop {
                let (j, i) = w.pixel();
                if j < 0 || j >= width || i < 0 || i >= height {
                    break;
                }
                let idx = (i * width + j) as usize;
                if mask[idx] {
                    if good_line {
                        for n in 0..num_angle {
                            let bin = &mut accum[n * num_rho + rho_bin(n, j, i)];
                            *bin = bin.saturating_sub(1);
                        }
                    }
                    mask[idx] = false;
                }
                if (j, i) == *end {
                    break;
                }
                w.step();
            }
        }

        if good_line {
            segments.push(LineSegment::new(
                line_end[0].0,
                line_end[0].1,
                line_end[1].0,
                line_end[1].1,
            ));
        }
    }

    segments
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    fn edge_image(points: &[(u32, u32)]) -> GrayImage {
        let mut img = GrayImage::new(200, 150);
        for &(x, y) in points {
            img.put_pixel(x, y, Luma([255]));
        }
        img
    }

    #[test]
    fn test_empty_image_has_no_lines() {
        let img = GrayImage::new(64, 48);
        assert!(hough_lines_p(&img, &HoughParams::default()).is_empty());
    }

    #[test]
    fn test_finds_vertical_line() {
        let points: Vec<(u32, u32)> = (20..120).map(|y| (50, y)).collect();
        let segs = hough_lines_p(&edge_image(&points), &HoughParams::default());

        assert_eq!(segs.len(), 1);
        let s = segs[0];
        assert_eq!((s.x1, s.x2), (50, 50));
        assert_eq!(s.y1.min(s.y2), 20);
        assert_eq!(s.y1.max(s.y2), 119);
    }

    #[test]
    fn test_bridges_small_gaps() {
        // Dashed diagonal with 5 px gaps
        let points: Vec<(u32, u32)> = (10..140)
            .filter(|i| (i / 10) % 2 == 0 || i % 10 >= 5)
            .map(|i| (i + 20, i))
            .collect();

        let params = HoughParams {
            threshold: 30,
            max_line_gap_px: 10,
            ..Default::default()
        };
        let segs = hough_lines_p(&edge_image(&points), &params);

        assert!(!segs.is_empty());
        let longest = segs.iter().map(|s| s.length()).fold(0f64, f64::max);
        assert!(longest > 150.0, "longest segment {}", longest);
    }

    #[test]
    fn test_short_lines_rejected() {
        let points: Vec<(u32, u32)> = (0..60).map(|x| (x + 30, 70)).collect();
        let params = HoughParams {
            threshold: 20,
            min_line_length_px: 80,
            ..Default::default()
        };
        assert!(hough_lines_p(&edge_image(&points), &params).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let mut points: Vec<(u32, u32)> = (0..120).map(|i| (i + 40, i + 10)).collect();
        points.extend((0..140).map(|y| (30, y)));
        let img = edge_image(&points);

        let params = HoughParams::default();
        assert_eq!(hough_lines_p(&img, &params), hough_lines_p(&img, &params));
    }
}
