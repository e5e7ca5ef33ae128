//! PDF report composition.
//!
//! Stage 3 of the pipeline. Layout and rendering are split the same way the
//! imaging module splits calculations from the backend:
//!
//! - [`plan_layout`] is pure: thumbnail sizes in, [`Placement`]s out.
//! - [`write_report`] draws a plan with `lopdf` and saves the document.
//!
//! ## Entry layout
//!
//! Thumbnails are drawn at one point per pixel, left-aligned on the margin.
//! Six lines of metadata follow below each one:
//!
//! ```text
//!  cursor ──────► ┌───────────────┐
//!                 │   thumbnail   │
//!                 └───────────────┘ ◄── image bottom = cursor - thumb_h
//!                 File name: a.jpg      baseline 1 = bottom - 1 × line_height
//!                 Document Type: JPEG
//!                 ...                   baseline 6 = bottom - 6 × line_height
//!
//!  next cursor = cursor - thumb_h - 7 × line_height - entry_spacing
//! ```
//!
//! ## Pagination
//!
//! The composer is either awaiting an entry or the page is full. An entry
//! needs `thumb_h + 6 × line_height + entry_spacing`; when that exceeds the
//! space left above the bottom margin *and* the page already holds an entry,
//! a new page starts with the cursor back at the top margin. An entry that is
//! taller than an empty page is placed anyway and overflows the bottom
//! margin, so no blank pages are ever produced.
//!
//! With no entries at all the document still gets one blank page.

use crate::config::{LayoutConfig, TEXT_LINES_PER_ENTRY};
use crate::imaging::Dimensions;
use crate::types::ImageEntry;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::encodings::WIN_ANSI_ENCODING;
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Cannot read thumbnail {0}: {1}")]
    Thumbnail(PathBuf, #[source] image::ImageError),
}

/// Resource name of the report font.
const FONT_NAME: &str = "F1";

// ============================================================================
// Layout
// ============================================================================

/// Where one entry lands, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based page index.
    pub page: usize,
    /// Cursor position when the entry was placed.
    pub top: f32,
    pub image_x: f32,
    pub image_bottom: f32,
    pub image_width: f32,
    pub image_height: f32,
    /// Text baselines, first line first.
    pub baselines: [f32; TEXT_LINES_PER_ENTRY],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    AwaitingEntry,
    PageFull,
}

/// Vertical cursor over the current page.
#[derive(Debug, Clone)]
pub struct PageCursor<'a> {
    config: &'a LayoutConfig,
    page: usize,
    y: f32,
    entries_on_page: usize,
}

impl<'a> PageCursor<'a> {
    pub fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            page: 0,
            y: config.top(),
            entries_on_page: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Space left between the cursor and the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.y - self.config.margin
    }

    /// State of the composer for an entry needing `needed` points.
    pub fn state_for(&self, needed: f32) -> ComposerState {
        if self.entries_on_page > 0 && self.remaining() < needed {
            ComposerState::PageFull
        } else {
            ComposerState::AwaitingEntry
        }
    }

    pub fn start_page(&mut self) {
        self.page += 1;
        self.y = self.config.top();
        self.entries_on_page = 0;
    }

    /// Record an entry at the cursor and move past it.
    fn place(&mut self, size: Dimensions) -> Placement {
        let width = size.width as f32;
        let height = size.height as f32;
        let top = self.y;
        let image_bottom = top - height;
        let line_height = self.config.line_height;
        let baselines =
            std::array::from_fn(|k| image_bottom - (k as f32 + 1.0) * line_height);

        self.y = image_bottom
            - (TEXT_LINES_PER_ENTRY as f32 + 1.0) * line_height
            - self.config.entry_spacing;
        self.entries_on_page += 1;

        Placement {
            page: self.page,
            top,
            image_x: self.config.margin,
            image_bottom,
            image_width: width,
            image_height: height,
            baselines,
        }
    }
}

/// Paginate entries with the given thumbnail sizes, in order.
pub fn plan_layout(thumbnails: &[Dimensions], config: &LayoutConfig) -> Vec<Placement> {
    let mut cursor = PageCursor::new(config);
    thumbnails
        .iter()
        .map(|&size| {
            let needed = config.needed_space(size.height as f32);
            if cursor.state_for(needed) == ComposerState::PageFull {
                cursor.start_page();
            }
            cursor.place(size)
        })
        .collect()
}

/// Page count and per-page entry counts of a written report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub pages: usize,
    pub entries_per_page: Vec<usize>,
}

impl ReportSummary {
    fn from_plan(plan: &[Placement]) -> Self {
        let pages = plan.last().map_or(1, |p| p.page + 1);
        let mut entries_per_page = vec![0; pages];
        for placement in plan {
            entries_per_page[placement.page] += 1;
        }
        Self {
            pages,
            entries_per_page,
        }
    }

    pub fn entries(&self) -> usize {
        self.entries_per_page.iter().sum()
    }
}

// ============================================================================
// Text encoding
// ============================================================================

/// Encode text for a WinAnsi-encoded standard font.
///
/// Each character is looked up in lopdf's WinAnsi table; control characters
/// and anything the encoding cannot represent become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let Ok(unit) = u16::try_from(u32::from(c)) else {
                return b'?';
            };
            if c.is_control() {
                return b'?';
            }
            WIN_ANSI_ENCODING
                .iter()
                .position(|&code| code == Some(unit))
                .and_then(|byte| u8::try_from(byte).ok())
                .unwrap_or(b'?')
        })
        .collect()
}

// ============================================================================
// Rendering
// ============================================================================

/// Decode a thumbnail to 8-bit RGB, compositing any alpha over white.
fn load_rgb(path: &Path) -> Result<RgbImage, ReportError> {
    let img = image::open(path).map_err(|e| ReportError::Thumbnail(path.to_path_buf(), e))?;
    if !img.color().has_alpha() {
        return Ok(img.to_rgb8());
    }
    let rgba = img.to_rgba8();
    Ok(RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    }))
}

fn image_xobject(rgb: RgbImage) -> Stream {
    let (width, height) = rgb.dimensions();
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        rgb.into_raw(),
    )
}

/// Content operations for one entry: the image, then its six text lines.
fn entry_operations(
    image_name: &str,
    placement: &Placement,
    lines: &[String; TEXT_LINES_PER_ENTRY],
    config: &LayoutConfig,
) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                placement.image_width.into(),
                0.into(),
                0.into(),
                placement.image_height.into(),
                placement.image_x.into(),
                placement.image_bottom.into(),
            ],
        ),
        Operation::new("Do", vec![Object::Name(image_name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_NAME.into(), config.font_size.into()]),
        Operation::new(
            "Td",
            vec![placement.image_x.into(), placement.baselines[0].into()],
        ),
    ];
    for (k, line) in lines.iter().enumerate() {
        if k > 0 {
            ops.push(Operation::new(
                "Td",
                vec![0.into(), (-config.line_height).into()],
            ));
        }
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(line))],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Lay out `entries`, draw them, and save the PDF at `output`.
///
/// Every entry's thumbnail file must exist; a missing or unreadable
/// thumbnail is an error.
pub fn write_report(
    entries: &[ImageEntry],
    config: &LayoutConfig,
    output: &Path,
) -> Result<ReportSummary, ReportError> {
    let sizes: Vec<Dimensions> = entries.iter().map(|e| e.thumbnail_size).collect();
    let plan = plan_layout(&sizes, config);
    let summary = ReportSummary::from_plan(&plan);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    // Per page: content operations and the images it references
    let mut pages: Vec<(Vec<Operation>, lopdf::Dictionary)> =
        vec![(Vec::new(), lopdf::Dictionary::new()); summary.pages];

    for (index, (entry, placement)) in entries.iter().zip(&plan).enumerate() {
        let image_name = format!("Im{}", index + 1);
        let image_id = doc.add_object(image_xobject(load_rgb(&entry.thumbnail_path)?));

        let (ops, xobjects) = &mut pages[placement.page];
        xobjects.set(image_name.as_str(), image_id);
        ops.extend(entry_operations(
            &image_name,
            placement,
            &entry.text_lines(),
            config,
        ));
        tracing::debug!(
            "{}: page {} at y={:.1}",
            entry.filename,
            placement.page + 1,
            placement.top
        );
    }

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (operations, xobjects) in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content.encode()?));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_NAME => font_id },
            "XObject" => xobjects,
        });
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                config.page_width.into(),
                config.page_height.into(),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.compress();
    doc.save(output)?;

    tracing::info!(
        "wrote {} entries on {} pages to {}",
        summary.entries(),
        summary.pages,
        output.display()
    );
    Ok(summary)
}
