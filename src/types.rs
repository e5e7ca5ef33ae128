//! Shared types passed between pipeline stages.
//!
//! ```text
//! thumbnails  →  ThumbnailMap     (filename → thumbnail path + size)
//! metadata    →  Vec<ImageEntry>  (everything the report draws)
//! ```

use crate::imaging::Dimensions;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A generated thumbnail for one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRecord {
    pub path: PathBuf,
    pub size: Dimensions,
}

/// Thumbnails keyed by source filename.
///
/// A `BTreeMap` keeps iteration in lexicographic filename order, which is
/// also the order the folder was scanned in.
pub type ThumbnailMap = BTreeMap<String, ThumbnailRecord>;

/// One image's display data, as drawn in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub filename: String,
    /// Container format label, e.g. `JPEG` or `PNG`.
    pub doc_type: String,
    /// e.g. `1.23 MB`
    pub file_size: String,
    /// e.g. `05 March 2019 at 14:30`
    pub creation_date: String,
    pub width: u32,
    pub height: u32,
    /// e.g. `300 x 300 dpi`, `72 dpi`, or `Unknown`
    pub dpi: String,
    pub thumbnail_path: PathBuf,
    pub thumbnail_size: Dimensions,
}

impl ImageEntry {
    /// Pixel size of the original as `WIDTH x HEIGHT`.
    pub fn image_size(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    /// The six labelled lines drawn under the thumbnail, in drawing order.
    pub fn text_lines(&self) -> [String; 6] {
        [
            format!("File name: {}", self.filename),
            format!("Document Type: {}", self.doc_type),
            format!("File size: {}", self.file_size),
            format!("Creation Date: {}", self.creation_date),
            format!("Image size: {}", self.image_size()),
            format!("Image DPI: {}", self.dpi),
        ]
    }
}
