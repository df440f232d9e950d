use std::fs;
use std::path::Path;

use quran_typeset::HeadingStyle;
use serde::{Deserialize, Serialize};

use crate::render_engine::TypesetError;

/// Page geometry and typesetting knobs.
///
/// The defaults reproduce the 12-line Mushaf: 396 × 540 pt pages with a
/// 205 pt text block. Lengths are in points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesetConfig {
    /// Body font size.
    pub font_size: f64,
    /// Text lines per page.
    pub lines_per_page: usize,
    /// Baseline-to-baseline distance.
    pub leading: f64,
    /// Text block width per line of a page; the last entry repeats.
    pub text_widths: Vec<f64>,
    pub page_width: f64,
    pub page_height: f64,
    /// From the top of the page to the first baseline.
    pub top_margin: f64,
    pub outer_margin: f64,
    /// Baseline of the page number.
    pub page_number_ypos: f64,
    /// Draw the double frame around the text block.
    pub decorations: bool,
    /// Badness tolerance for paragraph lines.
    pub tolerance: f64,
    /// Heading height as a multiple of the leading.
    pub heading_factor: f64,
    /// How the verse count is written in headings.
    pub heading_style: HeadingStyle,
    /// Scale of margin notes relative to the body size.
    pub note_scale: f64,
}

impl Default for TypesetConfig {
    fn default() -> Self {
        Self {
            font_size: 11.5,
            lines_per_page: 12,
            leading: 29.0,
            text_widths: vec![205.0],
            page_width: 396.0,
            page_height: 540.0,
            top_margin: 105.0,
            outer_margin: 100.0,
            page_number_ypos: 460.0,
            decorations: true,
            tolerance: 4.0,
            heading_factor: 1.8,
            heading_style: HeadingStyle::Digits,
            note_scale: 0.8,
        }
    }
}

impl TypesetConfig {
    /// Load a JSON config; keys not present keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, TypesetError> {
        let payload = fs::read(path)
            .map_err(|err| TypesetError::Config(format!("{}: {}", path.display(), err)))?;
        let cfg: Self = serde_json::from_slice(&payload)
            .map_err(|err| TypesetError::Config(format!("{}: {}", path.display(), err)))?;
        Ok(cfg.normalized())
    }

    /// Replace degenerate values with usable ones.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        self.lines_per_page = self.lines_per_page.max(1);
        self.leading = positive_or(self.leading, defaults.leading);
        self.font_size = positive_or(self.font_size, defaults.font_size);
        self.tolerance = positive_or(self.tolerance, defaults.tolerance);
        self.note_scale = positive_or(self.note_scale, defaults.note_scale);
        if self.heading_factor.is_nan() || self.heading_factor < 1.0 {
            self.heading_factor = defaults.heading_factor;
        }
        self.text_widths.retain(|w| *w > 0.0);
        if self.text_widths.is_empty() {
            self.text_widths = defaults.text_widths;
        }
        self
    }

    /// Text block width for a 0-based line of a page.
    pub fn text_width(&self, line: usize) -> f64 {
        self.text_widths
            .get(line)
            .or_else(|| self.text_widths.last())
            .copied()
            .unwrap_or(0.0)
    }

    /// Page capacity measured in line heights.
    pub fn page_height_target(&self) -> f64 {
        self.leading * self.lines_per_page as f64
    }

    /// Right edge of the text block: text is set right-to-left from here.
    pub fn text_start_x(&self, page_number: usize, line: usize) -> f64 {
        if page_number % 2 == 0 {
            self.page_width - self.outer_margin
        } else {
            self.outer_margin + self.text_width(line)
        }
    }

    /// Left edge of a margin note of `width`, centred in the outer margin.
    pub fn margin_note_x(&self, page_number: usize, line: usize, width: f64) -> f64 {
        let x = self.outer_margin / 2.0 - width / 2.0;
        if page_number % 2 == 0 {
            x + self.text_start_x(page_number, line)
        } else {
            x
        }
    }

    /// Left edge of a page number of `width`, centred under the text block.
    pub fn page_number_x(&self, page_number: usize, width: f64) -> f64 {
        let line = self.lines_per_page.saturating_sub(1);
        self.text_start_x(page_number, line) - self.text_width(line) / 2.0 - width / 2.0
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        fallback
    }
}
