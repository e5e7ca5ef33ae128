//! Input folder listing.
//!
//! Only the top level of the folder is considered: sub-directories (including
//! a `thumbnails/` directory left by an earlier run) are ignored, symlinks to
//! regular files are followed. Files come back sorted by name, byte-wise,
//! which fixes the processing order for every later stage.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input folder not found: {0}")]
    NotFound(PathBuf),
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot read {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// A regular file found in the input folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub path: PathBuf,
}

/// List the regular files directly inside `folder`, sorted by filename.
///
/// Names that are not valid UTF-8 are skipped with a warning: they cannot be
/// printed in the report faithfully.
pub fn list_files(folder: &Path) -> Result<Vec<SourceFile>, ScanError> {
    if !folder.exists() {
        return Err(ScanError::NotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(ScanError::NotADirectory(folder.to_path_buf()));
    }

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // A dangling symlink is not a regular file; anything else is fatal
            Err(e) if e.io_error().is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound) => {
                tracing::debug!("skipping dangling link: {}", e);
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(folder).to_path_buf();
                return Err(ScanError::Walk { path, source: e });
            }
        };

        if !entry.file_type().is_file() {
            tracing::debug!("skipping non-file: {}", entry.path().display());
            continue;
        }

        let Some(filename) = entry.file_name().to_str().map(String::from) else {
            tracing::warn!("skipping non UTF-8 filename: {}", entry.path().display());
            continue;
        };

        files.push(SourceFile {
            filename,
            path: entry.into_path(),
        });
    }

    Ok(files)
}
