//! # Photo Report
//!
//! Turns a folder of images into a paginated PDF: one thumbnail per image,
//! with its file name, format, size, creation date, pixel size and resolution
//! printed underneath.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Each stage runs to completion before the next one starts:
//!
//! ```text
//! 1. Thumbnails  folder/        →  thumbnails/ + ThumbnailMap   (decodable images only)
//! 2. Metadata    ThumbnailMap   →  Vec<ImageEntry>              (re-reads each original)
//! 3. Report      Vec<ImageEntry> → report.pdf                   (paginated layout)
//! ```
//!
//! Files that do not decode as images are dropped in stage 1 and never seen
//! again. Every other failure is fatal and propagates to the caller.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists the regular files directly inside the input folder, sorted by name |
//! | [`thumbnails`] | Stage 1: bounded thumbnails written next to the report |
//! | [`metadata`] | Stage 2: date and DPI resolution chains, display formatting |
//! | [`report`] | Stage 3: pure page layout plus the `lopdf` renderer |
//! | [`pipeline`] | Runs the three stages for the CLI and integration tests |
//! | [`config`] | `LayoutConfig`: page geometry and text metrics |
//! | [`types`] | Data passed between stages (`ThumbnailMap`, `ImageEntry`) |
//! | [`imaging`] | Image backend trait, pure-Rust backend, container density and EXIF readers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Layout Configuration
//!
//! Page size, margins, thumbnail bound and text metrics live in one
//! [`config::LayoutConfig`] value handed to the stages that need it. There is
//! no config file; the defaults reproduce an A4 report with half-inch margins
//! and 5-inch thumbnails.
//!
//! ## Fallback Chains as Data
//!
//! Where a value can come from several places (capture date, resolution),
//! the sources are an ordered slice of resolver functions and the first one
//! that answers wins. See [`metadata::first_resolved`].
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and resizing use the `image` crate, EXIF parsing uses
//! `kamadak-exif`, and the PDF is assembled with `lopdf`. No system libraries
//! are needed at runtime.

pub mod config;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod thumbnails;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
