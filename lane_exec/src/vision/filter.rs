//! Smoothing, edge detection and morphology on single channel images.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::GrayImage;
use imageproc::{distance_transform::Norm, edges, filter, morphology};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Gaussian blur with the given standard deviation.
///
/// A sigma of 1.1 matches a 5x5 kernel with automatically chosen sigma.
/// Non-positive sigmas return the image unchanged.
pub fn blur(img: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return img.clone();
    }
    filter::gaussian_blur_f32(img, sigma)
}

/// Canny edge detector, edges are 255 and everything else 0.
pub fn canny(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    edges::canny(img, low_threshold, high_threshold)
}

/// Single iteration dilation with a 3x3 square structuring element.
pub fn dilate_3x3(img: &GrayImage) -> GrayImage {
    morphology::dilate(img, Norm::LInf, 1)
}

/// Set every pixel above `threshold` to 255 and the rest to 0, in place.
pub fn binarise(img: &mut GrayImage, threshold: u8) {
    for px in img.pixels_mut() {
        px.0[0] = if px.0[0] > threshold { 255 } else { 0 };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_dilate_grows_single_pixel() {
        let mut img = GrayImage::new(5, 5);
        img.put_pixel(2, 2, Luma([255]));

        let dilated = dilate_3x3(&img);

        let set: usize = dilated.pixels().filter(|p| p.0[0] == 255).count();
        assert_eq!(set, 9);
        assert_eq!(dilated.get_pixel(1, 1).0, [255]);
        assert_eq!(dilated.get_pixel(0, 0).0, [0]);
    }

    #[test]
    fn test_blur_then_binarise_widens_stroke() {
        let mut img = GrayImage::new(20, 20);
        for y in 0..20 {
            img.put_pixel(10, y, Luma([255]));
        }

        let mut blurred = blur(&img, 1.1);
        binarise(&mut blurred, 0);

        assert_eq!(blurred.get_pixel(9, 10).0, [255]);
        assert_eq!(blurred.get_pixel(11, 10).0, [255]);
        assert_eq!(blurred.get_pixel(0, 10).0, [0]);
    }

    #[test]
    fn test_canny_flat_image_has_no_edges() {
        let img = GrayImage::from_pixel(32, 32, Luma([90]));
        assert!(canny(&img, 50.0, 150.0).pixels().all(|p| p.0[0] == 0));
    }
}
