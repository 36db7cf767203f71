//! HSV conversion and colour range thresholding.
//!
//! Values follow the 8-bit convention used by most camera tooling: hue is
//! halved to fit in `0..180`, saturation and value span `0..=255`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An inclusive box in HSV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Lower bound as `[h, s, v]`
    pub low: [u8; 3],

    /// Upper bound as `[h, s, v]`
    pub high: [u8; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HsvRange {
    /// True if the HSV triple lies inside the range, bounds included.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.low[i] && hsv[i] <= self.high[i])
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert an RGB pixel to `[h, s, v]`.
pub fn rgb_to_hsv(px: &Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = px.0;
    let (r, g, b) = (r as f32, g as f32, b as f32);

    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    // Full turn rounds back onto red
    let h = ((h / 2.0).round() as u32 % 180) as u8;

    [h, s.round() as u8, v as u8]
}

/// Binary mask of the pixels whose HSV value lies in `range`.
///
/// Pixels inside the range are set to 255, all others to 0.
pub fn in_range_mask(frame: &RgbImage, range: &HsvRange) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());

    for (x, y, px) in frame.enumerate_pixels() {
        if range.contains(rgb_to_hsv(px)) {
            mask.put_pixel(x, y, Luma([255]));
        }
    }

    mask
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rgb_to_hsv() {
        assert_eq!(rgb_to_hsv(&Rgb([255, 255, 255])), [0, 0, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 0])), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(&Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 255])), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(&Rgb([255, 0, 255])), [150, 255, 255]);
    }

    #[test]
    fn test_white_mask() {
        let white = HsvRange {
            low: [0, 0, 150],
            high: [180, 60, 255],
        };

        let mut frame = RgbImage::from_pixel(3, 1, Rgb([40, 40, 40]));
        frame.put_pixel(1, 0, Rgb([230, 230, 220]));
        // Bright but strongly coloured
        frame.put_pixel(2, 0, Rgb([250, 200, 20]));

        let mask = in_range_mask(&frame, &white);

        assert_eq!(mask.get_pixel(0, 0).0, [0]);
        assert_eq!(mask.get_pixel(1, 0).0, [255]);
        assert_eq!(mask.get_pixel(2, 0).0, [0]);
    }
}
