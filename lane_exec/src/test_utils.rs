//! Synthetic camera frames for tests.

use image::{Rgb, RgbImage};

pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

/// Row at which the painted markings end.
pub const MARKING_TOP: u32 = 288;

const ROAD: Rgb<u8> = Rgb([45, 45, 50]);
const PAINT: Rgb<u8> = Rgb([240, 240, 235]);
const HALF_WIDTH: i32 = 5;

/// An empty dark road.
pub fn road_frame() -> RgbImage {
    RgbImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, ROAD)
}

/// A road with straight white markings, each given as `(x_bottom, x_top)`:
/// the marking's centre at the bottom row and at `MARKING_TOP`.
pub fn lane_frame(left: Option<(i32, i32)>, right: Option<(i32, i32)>) -> RgbImage {
    let mut frame = road_frame();

    for &(x_bottom, x_top) in left.iter().chain(right.iter()) {
        paint_marking(&mut frame, x_bottom, x_top);
    }

    frame
}

fn paint_marking(frame: &mut RgbImage, x_bottom: i32, x_top: i32) {
    let bottom = (FRAME_HEIGHT - 1) as i32;
    let top = MARKING_TOP as i32;

    for y in top..=bottom {
        let t = (bottom - y) as f64 / (bottom - top) as f64;
        let cx = (x_bottom as f64 + t * (x_top - x_bottom) as f64).round() as i32;

        for x in (cx - HALF_WIDTH)..=(cx + HALF_WIDTH) {
            if x >= 0 && x < FRAME_WIDTH as i32 {
                frame.put_pixel(x as u32, y as u32, PAINT);
            }
        }
    }
}
