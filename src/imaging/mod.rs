//! Image decoding, resizing and embedded-metadata parsing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader` (format sniffing + header dimensions) |
//! | **Thumbnail** | `resize_exact` (Lanczos3), re-encoded in the source format |
//! | **Density** | custom parser (JPEG JFIF APP0, PNG `pHYs`, BMP header) + `kamadak-exif` for TIFF IFD0 |
//! | **EXIF** | `kamadak-exif` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Metadata readers**: [`density`] and [`exif_tags`], both infallible

pub mod backend;
mod calculations;
pub mod density;
pub mod exif_tags;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageInfo};
pub use calculations::fit_within;
pub use density::{Density, read_density};
pub use exif_tags::{ExifTags, parse_exif_datetime, read_exif};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
