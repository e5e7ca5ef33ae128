//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs
//! from a decoder: identify (format + dimensions, header only) and thumbnail
//! (decode, bounded resize, encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the mock in this module's `tests` submodule.

use super::params::ThumbnailParams;
use image::ImageFormat;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not an image we can decode. Callers treat this as "skip".
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

impl BackendError {
    pub fn is_unreadable_image(&self) -> bool {
        matches!(self, BackendError::Decode(_))
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Sniff the container format and read dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError>;

    /// Decode `params.source`, shrink it to fit `params.max_dim` and write it
    /// to `params.output` in the source's format. Returns the written size.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError>;
}
