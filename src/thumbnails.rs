//! Thumbnail generation.
//!
//! Stage 1 of the pipeline. Every regular file in the input folder is handed
//! to the image backend; files that do not decode as images are skipped, the
//! rest are shrunk to fit the layout's thumbnail bound and written under their
//! original filename into the thumbnail directory.
//!
//! ```text
//! photos/                         out/thumbnails/
//! ├── a.jpg   (3000x2000)   →     ├── a.jpg   (360x240)
//! ├── b.png   (200x100)     →     ├── b.png   (200x100, never upscaled)
//! └── notes.txt             ✗     (skipped)
//! ```
//!
//! Anything other than an undecodable file (the thumbnail directory cannot be
//! created, an encode or write fails) aborts the stage.

use crate::config::LayoutConfig;
use crate::imaging::{BackendError, ImageBackend, Quality, ThumbnailParams};
use crate::scan::{self, ScanError};
use crate::types::{ThumbnailMap, ThumbnailRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Cannot create thumbnail directory {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("Thumbnail failed for {0}: {1}")]
    Imaging(PathBuf, #[source] BackendError),
}

/// Generate a thumbnail for every decodable image directly inside `folder`.
///
/// `thumb_dir` is created (with parents) if needed. Existing thumbnails with
/// the same name are overwritten, so repeated runs give the same result.
pub fn generate_thumbnails(
    backend: &impl ImageBackend,
    folder: &Path,
    thumb_dir: &Path,
    config: &LayoutConfig,
) -> Result<ThumbnailMap, ThumbnailError> {
    let files = scan::list_files(folder)?;
    std::fs::create_dir_all(thumb_dir)
        .map_err(|e| ThumbnailError::CreateDir(thumb_dir.to_path_buf(), e))?;

    let max_dim = config.max_thumbnail_px();
    let mut thumbnails = ThumbnailMap::new();
    let mut skipped = 0usize;

    for file in files {
        let params = ThumbnailParams {
            source: file.path.clone(),
            output: thumb_dir.join(&file.filename),
            max_dim,
            quality: Quality::default(),
        };

        match backend.thumbnail(&params) {
            Ok(size) => {
                tracing::debug!(
                    "{}: thumbnail {}x{}",
                    file.filename,
                    size.width,
                    size.height
                );
                thumbnails.insert(
                    file.filename,
                    ThumbnailRecord {
                        path: params.output,
                        size,
                    },
                );
            }
            Err(e) if e.is_unreadable_image() => {
                tracing::debug!("skipping {}: {}", file.filename, e);
                skipped += 1;
            }
            Err(e) => return Err(ThumbnailError::Imaging(file.path, e)),
        }
    }

    tracing::info!(
        "generated {} thumbnails in {} ({} files skipped)",
        thumbnails.len(),
        thumb_dir.display(),
        skipped
    );
    Ok(thumbnails)
}
