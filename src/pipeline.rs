//! Runs the three stages end to end.
//!
//! ```text
//! input folder ─► thumbnails ─► metadata ─► report ─► output.pdf
//!                     │
//!                     └─► <output dir>/thumbnails/
//! ```
//!
//! Each stage completes before the next one starts. The thumbnail directory is
//! always derived from the *absolute* output path, so a relative output such
//! as `report.pdf` puts thumbnails in `./thumbnails`.

use crate::config::{ConfigError, LayoutConfig};
use crate::imaging::{ImageBackend, RustBackend};
use crate::metadata::{self, MetadataError};
use crate::report::{self, ReportError, ReportSummary};
use crate::thumbnails::{self, ThumbnailError};
use crate::types::ImageEntry;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the thumbnail directory created next to the report.
pub const THUMBNAIL_DIR_NAME: &str = "thumbnails";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot resolve output path: {0}")]
    OutputPath(#[source] std::io::Error),
    #[error("Input folder {0} is the thumbnail directory; its images would be overwritten")]
    InputIsThumbnailDir(PathBuf),
    #[error(transparent)]
    Thumbnails(#[from] ThumbnailError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunResult {
    pub output: PathBuf,
    pub thumbnail_dir: PathBuf,
    pub entries: Vec<ImageEntry>,
    pub summary: ReportSummary,
}

/// `<directory of the absolute output path>/thumbnails`
pub fn thumbnail_dir_for(output: &Path) -> Result<PathBuf, PipelineError> {
    let absolute = std::path::absolute(output).map_err(PipelineError::OutputPath)?;
    let parent = absolute.parent().unwrap_or(&absolute);
    Ok(parent.join(THUMBNAIL_DIR_NAME))
}

/// Refuse to write thumbnails over the originals.
///
/// Paths are compared after canonicalisation, so `out/./thumbnails` or a
/// symlink to the same directory are caught too. A path that does not exist
/// yet cannot be the input folder.
pub fn ensure_distinct_dirs(input: &Path, thumbnail_dir: &Path) -> Result<(), PipelineError> {
    if let (Ok(input), Ok(thumbs)) = (
        std::fs::canonicalize(input),
        std::fs::canonicalize(thumbnail_dir),
    ) {
        if input == thumbs {
            return Err(PipelineError::InputIsThumbnailDir(input));
        }
    }
    Ok(())
}

/// Run all stages with the default image backend.
pub fn run(input: &Path, output: &Path, config: &LayoutConfig) -> Result<RunResult, PipelineError> {
    run_with_backend(&RustBackend::new(), input, output, config)
}

pub fn run_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output: &Path,
    config: &LayoutConfig,
) -> Result<RunResult, PipelineError> {
    config.validate()?;
    let thumbnail_dir = thumbnail_dir_for(output)?;
    ensure_distinct_dirs(input, &thumbnail_dir)?;

    let thumbs = thumbnails::generate_thumbnails(backend, input, &thumbnail_dir, config)?;
    let entries = metadata::collect_metadata(backend, input, &thumbs)?;
    let summary = report::write_report(&entries, config, output)?;

    Ok(RunResult {
        output: output.to_path_buf(),
        thumbnail_dir,
        entries,
        summary,
    })
}
