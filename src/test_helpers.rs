//! Shared test utilities: synthetic image fixtures.
//!
//! Everything is generated in memory, so no binary fixtures live in the repo.
//! Metadata that encoders do not write (EXIF blocks, PNG `pHYs`) is spliced
//! into the encoded bytes by hand.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! write_jpeg_with_exif(&tmp.path().join("a.jpg"), 64, 48, &ExifFixture {
//!     date_time_original: Some("2019:03:05 14:30:00"),
//!     ..ExifFixture::default()
//! });
//! ```

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{DynamicImage, ImageEncoder, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Pixel sources
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

// =========================================================================
// JPEG
// =========================================================================

fn encode_jpeg(width: u32, height: u32, density: Option<PixelDensity>) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
    if let Some(density) = density {
        encoder.set_pixel_density(density);
    }
    encoder
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A baseline JPEG with the encoder's default (aspect-only) JFIF header.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_jpeg(width, height, None)
}

/// A JPEG whose JFIF header declares `dpi` in both directions.
pub fn jpeg_bytes_with_density(width: u32, height: u32, dpi: u16) -> Vec<u8> {
    encode_jpeg(width, height, Some(PixelDensity::dpi(dpi)))
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// EXIF fields to embed. `None` leaves the tag out.
#[derive(Debug, Clone, Default)]
pub struct ExifFixture {
    pub date_time_original: Option<&'static str>,
    pub date_time: Option<&'static str>,
    /// (numerator, denominator, ResolutionUnit)
    pub resolution: Option<(u32, u32, u16)>,
}

impl ExifFixture {
    fn fields(&self) -> Vec<Field> {
        let ascii = |tag, s: &str| Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![s.as_bytes().to_vec()]),
        };

        let mut fields = Vec::new();
        if let Some(s) = self.date_time_original {
            fields.push(ascii(Tag::DateTimeOriginal, s));
        }
        if let Some(s) = self.date_time {
            fields.push(ascii(Tag::DateTime, s));
        }
        if let Some((num, denom, unit)) = self.resolution {
            let rational = Value::Rational(vec![Rational { num, denom }]);
            fields.push(Field {
                tag: Tag::XResolution,
                ifd_num: In::PRIMARY,
                value: rational.clone(),
            });
            fields.push(Field {
                tag: Tag::YResolution,
                ifd_num: In::PRIMARY,
                value: rational,
            });
            fields.push(Field {
                tag: Tag::ResolutionUnit,
                ifd_num: In::PRIMARY,
                value: Value::Short(vec![unit]),
            });
        }
        fields
    }

    /// Serialise to a little-endian TIFF structure, as carried in APP1.
    fn to_tiff(&self) -> Vec<u8> {
        let fields = self.fields();
        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, true).unwrap();
        buf.into_inner()
    }
}

/// Insert an `Exif\0\0` APP1 segment right after SOI.
fn splice_app1(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let seg_len = u16::try_from(2 + 6 + tiff.len()).unwrap();
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&seg_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A bare TIFF structure (header + IFD0, no strips) carrying the tags.
/// Enough for tag readers; not a decodable image.
pub fn tiff_bytes_with_resolution(exif: &ExifFixture) -> Vec<u8> {
    exif.to_tiff()
}

pub fn jpeg_bytes_with_exif(width: u32, height: u32, exif: &ExifFixture) -> Vec<u8> {
    splice_app1(&jpeg_bytes(width, height), &exif.to_tiff())
}

pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, exif: &ExifFixture) {
    std::fs::write(path, jpeg_bytes_with_exif(width, height, exif)).unwrap();
}

// =========================================================================
// PNG
// =========================================================================

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_bytes(width, height)).unwrap();
}

// =========================================================================
// BMP
// =========================================================================

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp)
        .unwrap();
    buf
}

/// A BMP whose info header declares `pels_per_metre` in both directions.
pub fn bmp_bytes_with_density(width: u32, height: u32, pels_per_metre: i32) -> Vec<u8> {
    let mut bmp = bmp_bytes(width, height);
    bmp[38..42].copy_from_slice(&pels_per_metre.to_le_bytes());
    bmp[42..46].copy_from_slice(&pels_per_metre.to_le_bytes());
    bmp
}

// =========================================================================
// PNG checksums
// =========================================================================

/// CRC-32 (ISO-HDLC), as used by PNG chunk trailers.
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// A PNG with a `pHYs` chunk inserted right after `IHDR`.
pub fn png_bytes_with_phys(width: u32, height: u32, x: u32, y: u32, unit: u8) -> Vec<u8> {
    let png = png_bytes(width, height);
    // Signature (8) + IHDR chunk (4 + 4 + 13 + 4)
    let insert_at = 8 + 25;

    let mut chunk_data = b"pHYs".to_vec();
    chunk_data.extend_from_slice(&x.to_be_bytes());
    chunk_data.extend_from_slice(&y.to_be_bytes());
    chunk_data.push(unit);

    let mut out = png[..insert_at].to_vec();
    out.extend_from_slice(&9u32.to_be_bytes());
    out.extend_from_slice(&chunk_data);
    out.extend_from_slice(&crc32(&chunk_data).to_be_bytes());
    out.extend_from_slice(&png[insert_at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_reference_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn spliced_fixtures_still_decode() {
        let jpeg = jpeg_bytes_with_exif(
            20,
            10,
            &ExifFixture {
                date_time: Some("2021:06:01 09:15:00"),
                ..ExifFixture::default()
            },
        );
        let img = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));

        let png = png_bytes_with_phys(12, 6, 2835, 2835, 1);
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (12, 6));
    }
}
