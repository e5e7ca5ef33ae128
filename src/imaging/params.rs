//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. The thumbnail
//! stage builds them; the [`backend`](super::backend) does the pixel work.
//! Keeping them separate lets tests swap in a mock backend.

use std::path::PathBuf;

/// Quality setting for lossy thumbnail encoding (1-100).
///
/// Only JPEG thumbnails are lossy; other formats are written losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a thumbnail operation (bounded resize, same format).
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Longest allowed edge in pixels.
    pub max_dim: u32,
    pub quality: Quality,
}
