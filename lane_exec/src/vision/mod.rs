//! # Vision primitives
//!
//! Image processing building blocks used by the lane detector: colour
//! thresholding, smoothing and edge detection, region of interest masking and
//! the probabilistic Hough transform.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod filter;
mod hough;
mod hsv;
mod roi;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use filter::*;
pub use hough::*;
pub use hsv::*;
pub use roi::*;
