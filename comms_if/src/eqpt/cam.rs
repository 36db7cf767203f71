//! # Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single colour frame from the forward facing camera.
#[derive(Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// Sequence number of the frame, starting from zero for the first frame of a source
    pub seq: u64,

    /// The image itself, in RGB order
    pub image: RgbImage,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamImage {
    /// Build a camera image from a decoded image of any colour type, timestamped now.
    pub fn from_dynamic(image: DynamicImage, seq: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            seq,
            image: image.to_rgb8(),
        }
    }

    /// Width of the frame in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the frame in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True if the frame contains no pixels.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_dynamic_converts_to_rgb() {
        let gray = image::GrayImage::from_pixel(4, 3, image::Luma([200u8]));
        let cam = CamImage::from_dynamic(DynamicImage::ImageLuma8(gray), 7);

        assert_eq!((cam.width(), cam.height()), (4, 3));
        assert_eq!(cam.seq, 7);
        assert_eq!(cam.image.get_pixel(2, 1).0, [200, 200, 200]);
        assert!(!cam.is_empty());
        assert!(CamImage::from_dynamic(DynamicImage::new_rgb8(0, 0), 0).is_empty());
    }
}
