//! EXIF tag extraction via kamadak-exif.
//!
//! Only the four tags the report uses are read. Missing tags, files without
//! an EXIF block and unsupported containers all produce empty fields; this
//! module never fails.

use chrono::NaiveDateTime;
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;

/// The subset of EXIF the report consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifTags {
    /// `DateTimeOriginal` (Exif IFD), raw string.
    pub date_time_original: Option<String>,
    /// `DateTime` (IFD0), raw string.
    pub date_time: Option<String>,
    pub x_resolution: Option<f64>,
    /// 1 = no unit, 2 = inch, 3 = centimetre.
    pub resolution_unit: Option<u32>,
}

/// Read EXIF tags from an in-memory image file (JPEG, TIFF, PNG, WebP, HEIF).
pub fn read_exif(data: &[u8]) -> ExifTags {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!("no EXIF: {}", e);
            return ExifTags::default();
        }
    };

    ExifTags {
        date_time_original: read_ascii_tag(&exif, Tag::DateTimeOriginal),
        date_time: read_ascii_tag(&exif, Tag::DateTime),
        x_resolution: read_rational_tag(&exif, Tag::XResolution),
        resolution_unit: exif
            .get_field(Tag::ResolutionUnit, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0)),
    }
}

fn read_ascii_tag(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(vecs) => {
            let s = vecs
                .first()
                .and_then(|v| std::str::from_utf8(v).ok())?
                .trim()
                .to_string();
            if s.is_empty() { None } else { Some(s) }
        }
        _ => None,
    }
}

fn read_rational_tag(exif: &Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(v) => v
            .first()
            .filter(|r| r.denom != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

/// Parse an EXIF timestamp (`YYYY:MM:DD HH:MM:SS`).
///
/// Trailing data after the seconds (some cameras append a NUL or subseconds)
/// is ignored. Blank-filled dates such as `"    :  :     :  :  "` fail.
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.get(..19)?;
    NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S").ok()
}
