//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` (magic bytes, not extension) |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate decoders |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | source format; JPEG via `JpegEncoder` at the requested quality |

use super::backend::{BackendError, Dimensions, ImageBackend, ImageInfo};
use super::calculations::fit_within;
use super::params::{Quality, ThumbnailParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a file and sniff its format from the leading bytes.
///
/// Failing to open the file is an I/O error; a file whose content matches no
/// known format is a decode error.
fn open_reader(path: &Path) -> Result<(ImageReader<BufReader<File>>, ImageFormat), BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = reader.format().ok_or_else(|| {
        BackendError::Decode(format!("{}: unrecognised image format", path.display()))
    })?;
    Ok((reader, format))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<(DynamicImage, ImageFormat), BackendError> {
    let (reader, format) = open_reader(path)?;
    // Truncated or corrupt payloads surface here, sometimes as io errors from
    // the decoder; all of them mean "not a usable image".
    let img = reader
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))?;
    Ok((img, format))
}

/// Save a thumbnail in the same format as its source.
fn save_image(
    img: DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let result = if format == ImageFormat::Jpeg {
        // JPEG has no alpha and no 16-bit mode
        let img = match img {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        let writer = BufWriter::new(File::create(path)?);
        img.write_with_encoder(JpegEncoder::new_with_quality(writer, quality.value()))
    } else {
        img.save_with_format(path, format)
    };

    result.map_err(|e| match e {
        ImageError::IoError(io) => BackendError::Io(io),
        other => BackendError::Encode(format!("{}: {}", path.display(), other)),
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<ImageInfo, BackendError> {
        let (reader, format) = open_reader(path)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))?;
        Ok(ImageInfo {
            format,
            dimensions: Dimensions { width, height },
        })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Dimensions, BackendError> {
        let (img, format) = load_image(&params.source)?;

        let (width, height) = fit_within((img.width(), img.height()), params.max_dim);
        let resized = if (width, height) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        save_image(resized, &params.output, format, params.quality)?;
        Ok(Dimensions { width, height })
    }
}
