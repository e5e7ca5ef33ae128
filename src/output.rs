//! CLI output formatting.
//!
//! The report itself is the product; stdout only summarises what went into
//! it. Every image is listed by its positional index and filename, with the
//! facts printed in the PDF shown as indented context lines, followed by the
//! page breakdown and the final `PDF report generated:` line.
//!
//! ```text
//! Images
//! 001 a.png
//!     PNG, 50 x 80, Unknown
//!     Thumbnail: 50 x 80
//! 002 b.jpg
//!     JPEG, 600 x 400, 72 dpi
//!     Thumbnail: 360 x 240
//!
//! Pages
//! 001 2 images
//!
//! Thumbnails: /data/out/thumbnails
//! PDF report generated: out/report.pdf
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and `print_run_output` writes the whole thing to stdout.
//! Format functions are pure: no I/O, no side effects.

use crate::pipeline::RunResult;
use crate::report::ReportSummary;
use crate::types::ImageEntry;
use std::path::Path;

// ============================================================================
// Helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// One block per image, in report order.
pub fn format_entries(entries: &[ImageEntry]) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    if entries.is_empty() {
        lines.push(format!("{}(no images found)", indent(1)));
        return lines;
    }
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.filename));
        lines.push(format!(
            "{}{}, {}, {}",
            indent(1),
            entry.doc_type,
            entry.image_size(),
            entry.dpi
        ));
        lines.push(format!(
            "{}Thumbnail: {} x {}",
            indent(1),
            entry.thumbnail_size.width,
            entry.thumbnail_size.height
        ));
    }
    lines
}

/// Entries per page. A report without images still has its blank page.
pub fn format_pages(summary: &ReportSummary) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for (i, count) in summary.entries_per_page.iter().enumerate() {
        let detail = if *count == 0 {
            "(blank)".to_string()
        } else {
            plural(*count, "image")
        };
        lines.push(format!("{} {}", format_index(i + 1), detail));
    }
    lines
}

/// The closing lines naming the files written.
pub fn format_footer(thumbnail_dir: &Path, output: &Path) -> Vec<String> {
    vec![
        format!("Thumbnails: {}", thumbnail_dir.display()),
        format!("PDF report generated: {}", output.display()),
    ]
}

pub fn format_run_output(result: &RunResult) -> Vec<String> {
    let mut lines = format_entries(&result.entries);
    lines.push(String::new());
    lines.extend(format_pages(&result.summary));
    lines.push(String::new());
    lines.extend(format_footer(&result.thumbnail_dir, &result.output));
    lines
}

/// Print the run summary to stdout.
pub fn print_run_output(result: &RunResult) {
    for line in format_run_output(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
