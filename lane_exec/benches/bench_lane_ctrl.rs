//! # Lane Control Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_polygon_mut, point::Point};

use lane_lib::lane_ctrl::{LaneCtrl, Params};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

/// Draw a grey road with a white marking quadrilateral running from
/// `x_bottom` at the bottom row up to `x_top` at 60% of the height.
fn draw_marking(img: &mut RgbImage, x_bottom: i32, x_top: i32) {
    let y_bottom = HEIGHT as i32 - 1;
    let y_top = (HEIGHT as f64 * 0.6) as i32;

    draw_polygon_mut(
        img,
        &[
            Point::new(x_bottom - 6, y_bottom),
            Point::new(x_bottom + 6, y_bottom),
            Point::new(x_top + 4, y_top),
            Point::new(x_top - 4, y_top),
        ],
        Rgb([250, 250, 250]),
    );
}

fn lane_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build test frames ----

    // Both markings visible, lane centred
    let mut two_sided = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([45, 45, 50]));
    draw_marking(&mut two_sided, 170, 250);
    draw_marking(&mut two_sided, 470, 390);

    // Only the left marking, which sends the segment path short of
    // segments and into the polynomial fallback
    let mut one_sided = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([45, 45, 50]));
    draw_marking(&mut one_sided, 170, 250);

    // ---- Benchmarks ----

    let mut lane_ctrl = LaneCtrl::new(Params::default());

    c.bench_function("extract_segments", |b| {
        b.iter(|| lane_ctrl.extract_segments(&two_sided))
    });

    c.bench_function("detect_lanes_polynomial", |b| {
        b.iter(|| lane_ctrl.detect_lanes_polynomial(&one_sided))
    });

    c.bench_function("process two sided", |b| {
        b.iter(|| lane_ctrl.process(&two_sided))
    });

    c.bench_function("process one sided", |b| {
        b.iter(|| lane_ctrl.process(&one_sided))
    });
}

criterion_group!(benches, lane_ctrl_benchmark);
criterion_main!(benches);
