//! Minimal pixel-density reader for JPEG, PNG, TIFF and BMP containers.
//!
//! This is the resolution a viewer attaches to the decoded image itself,
//! as opposed to the `XResolution` of an embedded EXIF block:
//!
//! - JPEG: JFIF APP0 segment, units byte + X/Y density (big-endian u16).
//!   Unit 1 is dots per inch, unit 2 dots per centimetre, unit 0 only
//!   states an aspect ratio and carries no resolution.
//! - PNG: `pHYs` chunk, pixels per unit X/Y (big-endian u32) + unit byte.
//!   Unit 1 is the metre; unit 0 is aspect-only.
//! - TIFF: `XResolution`/`YResolution` in IFD0 with `ResolutionUnit`
//!   (2 inch, 3 centimetre, absent means inch; 1 has no absolute unit).
//! - BMP: `biXPelsPerMeter`/`biYPelsPerMeter` of the info header
//!   (little-endian i32, zero means unset).
//!
//! Values are normalised to dots per inch.

use exif::{Exif, In, Reader, Tag, Value};
use image::ImageFormat;

const CM_PER_INCH: f64 = 2.54;
const METRES_PER_INCH: f64 = 0.0254;

/// Horizontal and vertical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Density {
    pub x: f64,
    pub y: f64,
}

/// Read the embedded density of an image, dispatching on its sniffed format.
/// Returns `None` for other formats and on any parse failure.
pub fn read_density(data: &[u8], format: ImageFormat) -> Option<Density> {
    match format {
        ImageFormat::Jpeg => read_jfif_density(data),
        ImageFormat::Png => read_png_density(data),
        ImageFormat::Tiff => read_tiff_density(data),
        ImageFormat::Bmp => read_bmp_density(data),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JPEG: JFIF APP0
// ---------------------------------------------------------------------------

const JFIF_IDENTIFIER: &[u8] = b"JFIF\0";

/// Walk JPEG marker segments up to the first scan, looking for JFIF APP0.
fn read_jfif_density(data: &[u8]) -> Option<Density> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes between segments
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS: entropy-coded data follows, no more header segments
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        // Markers without a length field
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xE0 {
            if let Some(density) = parse_jfif_segment(&data[seg_start..seg_end]) {
                return Some(density);
            }
        }

        pos += 2 + seg_len;
    }
    None
}

/// Parse the payload of an APP0 segment.
///
/// Layout: "JFIF\0" (5), version (2), units (1), Xdensity (2), Ydensity (2), ...
fn parse_jfif_segment(segment: &[u8]) -> Option<Density> {
    let body = segment.strip_prefix(JFIF_IDENTIFIER)?;
    if body.len() < 7 {
        return None;
    }
    let units = body[2];
    let x = u16::from_be_bytes([body[3], body[4]]) as f64;
    let y = u16::from_be_bytes([body[5], body[6]]) as f64;
    if x == 0.0 || y == 0.0 {
        return None;
    }

    match units {
        1 => Some(Density { x, y }),
        2 => Some(Density {
            x: x * CM_PER_INCH,
            y: y * CM_PER_INCH,
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Walk PNG chunks until `IDAT`, looking for `pHYs`.
fn read_png_density(data: &[u8]) -> Option<Density> {
    let mut pos = data.strip_prefix(PNG_SIGNATURE).map(|_| PNG_SIGNATURE.len())?;

    // Each chunk: length (4) + type (4) + data (length) + CRC (4)
    while pos + 8 <= data.len() {
        let length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let chunk_type = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(length)?;
        if body_end > data.len() {
            return None;
        }

        match chunk_type {
            b"pHYs" => return parse_phys_chunk(&data[body_start..body_end]),
            // pHYs must precede the image data
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }

        pos = body_end + 4;
    }
    None
}

/// Layout: pixels per unit X (4), pixels per unit Y (4), unit (1).
fn parse_phys_chunk(body: &[u8]) -> Option<Density> {
    if body.len() < 9 {
        return None;
    }
    let x = u32::from_be_bytes([body[0], body[1], body[2], body[3]]) as f64;
    let y = u32::from_be_bytes([body[4], body[5], body[6], body[7]]) as f64;
    if body[8] != 1 || x == 0.0 || y == 0.0 {
        return None;
    }
    Some(Density {
        x: x * METRES_PER_INCH,
        y: y * METRES_PER_INCH,
    })
}

// ---------------------------------------------------------------------------
// TIFF: IFD0 resolution tags
// ---------------------------------------------------------------------------

fn read_tiff_density(data: &[u8]) -> Option<Density> {
    let exif = Reader::new().read_raw(data.to_vec()).ok()?;
    let x = tiff_rational(&exif, Tag::XResolution)?;
    let y = tiff_rational(&exif, Tag::YResolution).unwrap_or(x);
    let unit = exif
        .get_field(Tag::ResolutionUnit, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(2);

    match unit {
        2 => Some(Density { x, y }),
        3 => Some(Density {
            x: x * CM_PER_INCH,
            y: y * CM_PER_INCH,
        }),
        _ => None,
    }
}

fn tiff_rational(exif: &Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Rational(v) => v
            .first()
            .filter(|r| r.denom != 0 && r.num != 0)
            .map(|r| r.to_f64()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// BMP: info header
// ---------------------------------------------------------------------------

/// Layout: "BM" file header (14), info header size (4) at 14, ...,
/// X pels/metre (4) at 38, Y pels/metre (4) at 42.
fn read_bmp_density(data: &[u8]) -> Option<Density> {
    if !data.starts_with(b"BM") || data.len() < 46 {
        return None;
    }
    let header_size = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
    // OS/2 BITMAPCOREHEADER has no resolution fields
    if header_size < 40 {
        return None;
    }
    let x = i32::from_le_bytes([data[38], data[39], data[40], data[41]]);
    let y = i32::from_le_bytes([data[42], data[43], data[44], data[45]]);
    if x <= 0 || y <= 0 {
        return None;
    }
    Some(Density {
        x: x as f64 * METRES_PER_INCH,
        y: y as f64 * METRES_PER_INCH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        ExifFixture, bmp_bytes, bmp_bytes_with_density, jpeg_bytes_with_density, png_bytes,
        png_bytes_with_phys, tiff_bytes_with_resolution,
    };

    fn jfif_app0(units: u8, x: u16, y: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[0x01, 0x01, units]);
        data.extend_from_slice(&x.to_be_bytes());
        data.extend_from_slice(&y.to_be_bytes());
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(&[0xFF, 0xDA]);
        data
    }

    #[test]
    fn jfif_dots_per_inch() {
        let density = read_jfif_density(&jfif_app0(1, 300, 240)).unwrap();
        assert_eq!(density, Density { x: 300.0, y: 240.0 });
    }

    #[test]
    fn jfif_dots_per_cm_converted_to_inch() {
        let density = read_jfif_density(&jfif_app0(2, 100, 100)).unwrap();
        assert!((density.x - 254.0).abs() < 1e-9);
        assert!((density.y - 254.0).abs() < 1e-9);
    }

    #[test]
    fn jfif_aspect_only_has_no_density() {
        assert_eq!(read_jfif_density(&jfif_app0(0, 1, 1)), None);
    }

    #[test]
    fn jfif_zero_density_is_ignored() {
        assert_eq!(read_jfif_density(&jfif_app0(1, 0, 72)), None);
    }

    #[test]
    fn skips_other_segments_before_app0() {
        // APP1 with 4 bytes of junk, then APP0
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x06, 1, 2, 3, 4];
        data.extend_from_slice(&jfif_app0(1, 72, 72)[2..]);
        assert_eq!(
            read_jfif_density(&data),
            Some(Density { x: 72.0, y: 72.0 })
        );
    }

    #[test]
    fn not_a_jpeg() {
        assert_eq!(read_jfif_density(b"GIF89a"), None);
        assert_eq!(read_jfif_density(&[]), None);
    }

    #[test]
    fn truncated_segment_does_not_panic() {
        let data = jfif_app0(1, 300, 300);
        for len in 0..data.len() {
            let _ = read_jfif_density(&data[..len]);
        }
    }

    #[test]
    fn encoder_written_jpeg_density_round_trips() {
        let data = jpeg_bytes_with_density(16, 16, 300);
        assert_eq!(
            read_density(&data, ImageFormat::Jpeg),
            Some(Density { x: 300.0, y: 300.0 })
        );
    }

    #[test]
    fn png_phys_metres_converted_to_inch() {
        // 11811 px/m ≈ 300 dpi
        let data = png_bytes_with_phys(8, 8, 11811, 11811, 1);
        let density = read_density(&data, ImageFormat::Png).unwrap();
        assert!((density.x - 299.9994).abs() < 1e-3);
    }

    #[test]
    fn png_phys_unknown_unit_is_ignored() {
        let data = png_bytes_with_phys(8, 8, 1, 1, 0);
        assert_eq!(read_density(&data, ImageFormat::Png), None);
    }

    #[test]
    fn png_without_phys() {
        assert_eq!(read_density(&png_bytes(8, 8), ImageFormat::Png), None);
    }

    #[test]
    fn tiff_inch_resolution() {
        let data = tiff_bytes_with_resolution(&ExifFixture {
            resolution: Some((300, 1, 2)),
            ..ExifFixture::default()
        });
        assert_eq!(
            read_density(&data, ImageFormat::Tiff),
            Some(Density { x: 300.0, y: 300.0 })
        );
    }

    #[test]
    fn tiff_centimetre_resolution_converted_to_inch() {
        let data = tiff_bytes_with_resolution(&ExifFixture {
            resolution: Some((100, 1, 3)),
            ..ExifFixture::default()
        });
        let density = read_density(&data, ImageFormat::Tiff).unwrap();
        assert!((density.x - 254.0).abs() < 1e-9);
    }

    #[test]
    fn tiff_without_absolute_unit_has_no_density() {
        let data = tiff_bytes_with_resolution(&ExifFixture {
            resolution: Some((72, 1, 1)),
            ..ExifFixture::default()
        });
        assert_eq!(read_density(&data, ImageFormat::Tiff), None);
    }

    #[test]
    fn tiff_without_resolution_tags() {
        let data = tiff_bytes_with_resolution(&ExifFixture {
            date_time: Some("2021:06:01 09:15:00"),
            ..ExifFixture::default()
        });
        assert_eq!(read_density(&data, ImageFormat::Tiff), None);
        assert_eq!(read_density(b"II*\0garbage", ImageFormat::Tiff), None);
    }

    #[test]
    fn bmp_pels_per_metre_converted_to_inch() {
        // 3780 px/m ≈ 96 dpi
        let data = bmp_bytes_with_density(8, 8, 3780);
        let density = read_density(&data, ImageFormat::Bmp).unwrap();
        assert!((density.x - 96.012).abs() < 1e-3);
        assert!((density.y - 96.012).abs() < 1e-3);
    }

    #[test]
    fn bmp_without_density() {
        let data = bmp_bytes_with_density(8, 8, 0);
        assert_eq!(read_density(&data, ImageFormat::Bmp), None);
        assert_eq!(read_density(&bmp_bytes(8, 8)[..30], ImageFormat::Bmp), None);
    }

    #[test]
    fn other_formats_have_no_density() {
        assert_eq!(read_density(&png_bytes(8, 8), ImageFormat::Gif), None);
    }
}
