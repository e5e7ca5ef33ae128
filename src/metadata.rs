//! Image metadata extraction and resolution.
//!
//! Stage 2 of the pipeline. For every image that produced a thumbnail, the
//! original file is re-opened and turned into an [`ImageEntry`].
//!
//! ## Resolution priority
//!
//! Creation date and DPI each come from an ordered list of resolvers. The
//! first resolver that returns a value wins:
//!
//! ```text
//! creation date:  EXIF DateTimeOriginal → EXIF DateTime → filesystem time
//! dpi:            container density (JFIF / pHYs) → EXIF XResolution → "Unknown"
//! ```
//!
//! EXIF timestamps are taken as local wall-clock time, the way cameras record
//! them. A tag that is present but does not parse counts as absent, so the
//! next resolver gets its turn.
//!
//! ## Filesystem dates
//!
//! "Creation time" is not portable. Where the platform exposes a birth time
//! (macOS, Windows, Linux with statx) that is used; otherwise unix falls back
//! to the inode status-change time (`ctime`), which also moves on chmod or
//! rename. This is an approximation, not a bug.

use crate::imaging::{
    BackendError, ExifTags, ImageBackend, parse_exif_datetime, read_density, read_exif,
};
use crate::types::{ImageEntry, ThumbnailMap};
use chrono::{DateTime, Local, NaiveDateTime};
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Cannot re-open image {0}: {1}")]
    Imaging(PathBuf, #[source] BackendError),
}

/// DPI descriptor used when nothing in the file states a resolution.
pub const UNKNOWN_DPI: &str = "Unknown";

/// Date shown when every date resolver fails (only possible if the file
/// vanished between stat calls).
pub const UNKNOWN_DATE: &str = "Unknown";

/// Everything the resolvers may look at for one file.
pub struct ImageSources<'a> {
    pub path: &'a Path,
    pub format: ImageFormat,
    /// Raw file bytes.
    pub data: &'a [u8],
    pub exif: ExifTags,
}

/// A single step in a fallback chain.
pub type Resolver<T> = fn(&ImageSources) -> Option<T>;

/// Try each resolver in order and return the first value produced.
///
/// ```text
/// date: first_resolved(&[exif_date_time_original, exif_date_time, filesystem_created], src)
/// dpi:  first_resolved(&[embedded_density, exif_resolution], src)
/// ```
pub fn first_resolved<T>(resolvers: &[Resolver<T>], sources: &ImageSources) -> Option<T> {
    resolvers.iter().find_map(|resolve| resolve(sources))
}

pub const DATE_RESOLVERS: &[Resolver<NaiveDateTime>] =
    &[exif_date_time_original, exif_date_time, filesystem_created];

pub const DPI_RESOLVERS: &[Resolver<String>] = &[embedded_density, exif_resolution];

// ============================================================================
// Date resolvers
// ============================================================================

pub fn exif_date_time_original(sources: &ImageSources) -> Option<NaiveDateTime> {
    sources
        .exif
        .date_time_original
        .as_deref()
        .and_then(parse_exif_datetime)
}

pub fn exif_date_time(sources: &ImageSources) -> Option<NaiveDateTime> {
    sources.exif.date_time.as_deref().and_then(parse_exif_datetime)
}

pub fn filesystem_created(sources: &ImageSources) -> Option<NaiveDateTime> {
    let meta = fs::metadata(sources.path).ok()?;
    let time = first_available_time(
        meta.created().ok(),
        status_changed(&meta),
        meta.modified().ok(),
    )?;
    Some(DateTime::<Local>::from(time).naive_local())
}

/// Birth time, else status-change time, else modification time.
fn first_available_time(
    created: Option<SystemTime>,
    changed: Option<SystemTime>,
    modified: Option<SystemTime>,
) -> Option<SystemTime> {
    created.or(changed).or(modified)
}

#[cfg(unix)]
fn status_changed(meta: &fs::Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    let nanos = u32::try_from(meta.ctime_nsec()).ok()?;
    DateTime::from_timestamp(meta.ctime(), nanos).map(SystemTime::from)
}

#[cfg(not(unix))]
fn status_changed(meta: &fs::Metadata) -> Option<SystemTime> {
    meta.modified().ok()
}

// ============================================================================
// DPI resolvers
// ============================================================================

pub fn embedded_density(sources: &ImageSources) -> Option<String> {
    let density = read_density(sources.data, sources.format)?;
    Some(format!(
        "{} x {} dpi",
        format_number(density.x),
        format_number(density.y)
    ))
}

pub fn exif_resolution(sources: &ImageSources) -> Option<String> {
    let value = sources.exif.x_resolution?;
    let unit = match sources.exif.resolution_unit? {
        1 => "(no unit)",
        2 => "dpi",
        3 => "dpcm",
        _ => return None,
    };
    Some(format!("{} {}", format_number(value), unit))
}

// ============================================================================
// Formatting
// ============================================================================

/// Whole numbers print bare; fractions keep up to two decimals.
///
/// `72.0 → "72"`, `72.009 → "72.01"`, `118.1 → "118.1"`
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{:.2}", rounded);
        s.trim_end_matches('0').to_string()
    }
}

/// `bytes` as megabytes with two decimals, e.g. `"1.23 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// e.g. `"05 March 2019 at 14:30"`
pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format("%d %B %Y at %H:%M").to_string()
}

/// Format label in the style image tools print (`JPEG`, `PNG`, `TIFF`, ...).
pub fn format_label(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Ico => "ICO".to_string(),
        ImageFormat::Avif => "AVIF".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

// ============================================================================
// Stage entry point
// ============================================================================

/// Build one [`ImageEntry`] per thumbnail, in map order.
///
/// `folder` is the directory the thumbnails were generated from; each
/// original is looked up there by filename.
pub fn collect_metadata(
    backend: &impl ImageBackend,
    folder: &Path,
    thumbnails: &ThumbnailMap,
) -> Result<Vec<ImageEntry>, MetadataError> {
    let mut entries = Vec::with_capacity(thumbnails.len());

    for (filename, thumb) in thumbnails {
        let path = folder.join(filename);

        let info = backend
            .identify(&path)
            .map_err(|e| MetadataError::Imaging(path.clone(), e))?;
        let file_len = fs::metadata(&path)
            .map_err(|e| MetadataError::Io(path.clone(), e))?
            .len();
        let data = fs::read(&path).map_err(|e| MetadataError::Io(path.clone(), e))?;

        let sources = ImageSources {
            path: &path,
            format: info.format,
            data: &data,
            exif: read_exif(&data),
        };

        let creation_date = match first_resolved(DATE_RESOLVERS, &sources) {
            Some(dt) => format_date(&dt),
            None => UNKNOWN_DATE.to_string(),
        };
        let dpi = first_resolved(DPI_RESOLVERS, &sources).unwrap_or_else(|| {
            tracing::debug!("{}: no resolution information", filename);
            UNKNOWN_DPI.to_string()
        });

        entries.push(ImageEntry {
            filename: filename.clone(),
            doc_type: format_label(info.format),
            file_size: format_file_size(file_len),
            creation_date,
            width: info.dimensions.width,
            height: info.dimensions.height,
            dpi,
            thumbnail_path: thumb.path.clone(),
            thumbnail_size: thumb.size,
        });
    }

    tracing::info!("collected metadata for {} images", entries.len());
    Ok(entries)
}
