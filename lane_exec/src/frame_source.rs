//! # Frame sources
//!
//! Anything which can produce camera frames for the control loop. The car's
//! own camera is accessed through the same interface as recorded frames, so
//! a drive can be replayed offline.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::cam::CamImage;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// File extensions recognised as frames.
const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of camera frames.
pub trait FrameSource {
    /// Get the next frame, blocking until it is available.
    ///
    /// Returns `Ok(None)` once the source has no more frames.
    fn next_frame(&mut self) -> Result<Option<CamImage>, FrameSourceError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Replays the image files in a directory in file name order.
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    next_index: usize,

    /// Restart from the first frame after the last one
    looping: bool,

    /// Minimum time between frames, emulating the camera's frame rate
    frame_period: Option<Duration>,
    last_frame_instant: Option<Instant>,

    seq: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FrameSourceError {
    #[error("Could not read the frame directory {0}: {1}")]
    DirReadError(String, std::io::Error),

    #[error("No frames found in {0}")]
    NoFrames(String),

    #[error("Could not decode frame {0}: {1}")]
    DecodeError(String, image::ImageError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ImageDirSource {
    /// Open a directory of frames.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, FrameSourceError> {
        let dir = dir.as_ref();
        let dir_str = dir.display().to_string();

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| FrameSourceError::DirReadError(dir_str.clone(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_frame_file(p))
            .collect();

        if paths.is_empty() {
            return Err(FrameSourceError::NoFrames(dir_str));
        }

        paths.sort();

        info!("Found {} frames in {}", paths.len(), dir_str);

        Ok(Self {
            paths,
            next_index: 0,
            looping: false,
            frame_period: None,
            last_frame_instant: None,
            seq: 0,
        })
    }

    /// Restart from the first frame once all have been played.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Deliver frames no faster than `fps`. Zero or negative removes the limit.
    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.frame_period = if fps > 0.0 {
            Some(Duration::from_secs_f64(1.0 / fps))
        } else {
            None
        };
        self
    }

    pub fn num_frames(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<CamImage>, FrameSourceError> {
        if self.next_index >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            self.next_index = 0;
        }

        if let (Some(period), Some(last)) = (self.frame_period, self.last_frame_instant) {
            if let Some(wait) = period.checked_sub(last.elapsed()) {
                thread::sleep(wait);
            }
        }

        let path = &self.paths[self.next_index];
        self.next_index += 1;

        let image = image::open(path)
            .map_err(|e| FrameSourceError::DecodeError(path.display().to_string(), e))?;

        self.last_frame_instant = Some(Instant::now());
        let frame = CamImage::from_dynamic(image, self.seq);
        self.seq += 1;

        if frame.is_empty() {
            warn!("Frame {} is empty", path.display());
        }

        Ok(Some(frame))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{Rgb, RgbImage};

    fn frame_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_replays_in_name_order() {
        let dir = frame_dir("frame_source_order");

        for (name, value) in [("b.png", 20u8), ("a.png", 10), ("c.png", 30)].iter() {
            RgbImage::from_pixel(8, 6, Rgb([*value, 0, 0]))
                .save(dir.join(name))
                .unwrap();
        }
        fs::write(dir.join("notes.txt"), "not a frame").unwrap();

        let mut src = ImageDirSource::new(&dir).unwrap().looping(true);
        assert_eq!(src.num_frames(), 3);

        let reds: Vec<u8> = (0..4)
            .map(|_| src.next_frame().unwrap().unwrap().image.get_pixel(0, 0).0[0])
            .collect();
        assert_eq!(reds, vec![10, 20, 30, 10]);

        let mut once = ImageDirSource::new(&dir).unwrap();
        for seq in 0..3 {
            assert_eq!(once.next_frame().unwrap().unwrap().seq, seq);
        }
        assert!(once.next_frame().unwrap().is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_dir() {
        let dir = frame_dir("frame_source_empty");

        assert!(matches!(
            ImageDirSource::new(&dir),
            Err(FrameSourceError::NoFrames(_))
        ));
        assert!(matches!(
            ImageDirSource::new(dir.join("missing")),
            Err(FrameSourceError::DirReadError(_, _))
        ));

        fs::remove_dir_all(&dir).ok();
    }
}
