//! Region of interest masking.

use image::GrayImage;

/// Zero every row above `top_frac * height`, keeping the full width of the
/// bottom of the image.
pub fn mask_to_bottom(img: &mut GrayImage, top_frac: f64) {
    let top = roi_top_row(img.height(), top_frac);

    for (_, y, px) in img.enumerate_pixels_mut() {
        if y < top {
            px.0[0] = 0;
        }
    }
}

/// First row included in a region starting at `top_frac` of the height.
pub fn roi_top_row(height: u32, top_frac: f64) -> u32 {
    let top = (height as f64 * top_frac.max(0.0).min(1.0)) as u32;
    top.min(height)
}

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    #[test]
    fn test_mask_to_bottom() {
        let mut img = GrayImage::from_pixel(4, 10, Luma([255]));

        mask_to_bottom(&mut img, 0.5);

        assert_eq!(img.get_pixel(3, 4).0, [0]);
        assert_eq!(img.get_pixel(0, 5).0, [255]);
        assert_eq!(img.get_pixel(3, 9).0, [255]);
    }
}
