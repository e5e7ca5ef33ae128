//! Report layout configuration.
//!
//! There is no config file: the layout is a plain value built in code and
//! passed explicitly into the thumbnail and report stages. Tests construct
//! alternate geometries (tiny pages, large margins) to exercise pagination.
//!
//! ## Defaults
//!
//! ```text
//! page:            A4 (595.28 x 841.89 pt)
//! margin:          0.5 in  (36 pt) on every side
//! max thumbnail:   5 in    (360 px, rendered 1 px = 1 pt)
//! line height:     14 pt
//! entry spacing:   0.3 in  (21.6 pt)
//! font size:       10 pt
//! ```
//!
//! All lengths are PDF points (1/72 in).

use thiserror::Error;

/// PDF points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// A4 page size in points.
pub const A4: (f32, f32) = (595.275_6, 841.889_8);

/// Number of metadata lines drawn under each thumbnail.
pub const TEXT_LINES_PER_ENTRY: usize = 6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Page geometry and text metrics for the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    /// Uniform margin on all four sides.
    pub margin: f32,
    /// Longest allowed thumbnail edge, in pixels (drawn as points).
    pub max_thumbnail_dim: f32,
    pub line_height: f32,
    /// Vertical gap after each entry's text block.
    pub entry_spacing: f32,
    pub font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: A4.0,
            page_height: A4.1,
            margin: 0.5 * POINTS_PER_INCH,
            max_thumbnail_dim: 5.0 * POINTS_PER_INCH,
            line_height: 14.0,
            entry_spacing: 0.3 * POINTS_PER_INCH,
            font_size: 10.0,
        }
    }
}

impl LayoutConfig {
    /// Thumbnail bound in whole pixels.
    pub fn max_thumbnail_px(&self) -> u32 {
        self.max_thumbnail_dim.round() as u32
    }

    /// Cursor position at the top of a fresh page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    /// Vertical space an entry with a thumbnail of `thumb_height` needs.
    pub fn needed_space(&self, thumb_height: f32) -> f32 {
        thumb_height + TEXT_LINES_PER_ENTRY as f32 * self.line_height + self.entry_spacing
    }

    /// Validate that the geometry leaves a drawable area.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("max_thumbnail_dim", self.max_thumbnail_dim),
            ("line_height", self.line_height),
            ("font_size", self.font_size),
        ];
        for (name, value) in lengths {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(ConfigError::Validation("margin must be >= 0".into()));
        }
        if !(self.entry_spacing.is_finite() && self.entry_spacing >= 0.0) {
            return Err(ConfigError::Validation("entry_spacing must be >= 0".into()));
        }
        if 2.0 * self.margin >= self.page_width || 2.0 * self.margin >= self.page_height {
            return Err(ConfigError::Validation(
                "margins leave no drawable area on the page".into(),
            ));
        }
        if self.max_thumbnail_px() == 0 {
            return Err(ConfigError::Validation(
                "max_thumbnail_dim must round to at least 1 pixel".into(),
            ));
        }
        Ok(())
    }
}
