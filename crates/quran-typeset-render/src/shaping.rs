use core::fmt;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quran_typeset::markers::{is_left_to_right_word, PROSTRATION_MARK};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Text direction of a shaped run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

impl Direction {
    /// Direction used for a whole word: verse numbers and digit-only words run
    /// left-to-right, everything else right-to-left.
    pub fn for_word(word: &str) -> Self {
        if is_left_to_right_word(word) {
            Self::LeftToRight
        } else {
            Self::RightToLeft
        }
    }
}

/// Positioned glyph in visual (left-to-right) order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Glyph identifier in the shaping font.
    pub id: u32,
    /// Offset from the pen position.
    pub x_offset: f64,
    pub y_offset: f64,
    /// Pen advance after the glyph.
    pub advance: f64,
}

/// Glyphs and total advance of one shaped word.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapedRun {
    pub glyphs: SmallVec<[Glyph; 8]>,
    pub advance: f64,
    pub direction: Direction,
}

/// Shaping failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeError {
    pub message: Box<str>,
    pub text: Option<Box<str>>,
}

impl ShapeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into().into_boxed_str(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "shaping '{}': {}", text, self.message),
            None => write!(f, "shaping: {}", self.message),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Converts a word into glyphs and an advance width.
///
/// Implementations must be deterministic: the same text and direction always
/// yields the same run.
pub trait Shaper: Send + Sync {
    fn shape(&self, text: &str, direction: Direction) -> Result<ShapedRun, ShapeError>;
}

/// Font-free shaper with per-character em widths.
///
/// Glyph ids are the characters' scalar values. Arabic combining marks have
/// no advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicShaper {
    pub font_size: f64,
}

impl HeuristicShaper {
    pub fn new(font_size: f64) -> Self {
        Self { font_size }
    }
}

impl Shaper for HeuristicShaper {
    fn shape(&self, text: &str, direction: Direction) -> Result<ShapedRun, ShapeError> {
        let mut glyphs: SmallVec<[Glyph; 8]> = text
            .chars()
            .map(|ch| Glyph {
                id: ch as u32,
                x_offset: 0.0,
                y_offset: 0.0,
                advance: glyph_em_width(ch) * self.font_size,
            })
            .collect();
        if direction == Direction::RightToLeft {
            glyphs.reverse();
        }
        let advance = glyphs.iter().map(|g| g.advance).sum();
        Ok(ShapedRun {
            glyphs,
            advance,
            direction,
        })
    }
}

fn is_arabic_mark(ch: char) -> bool {
    matches!(ch,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06DC}'
        | '\u{06DF}'..='\u{06E4}'
        | '\u{06E7}'..='\u{06E8}'
        | '\u{06EA}'..='\u{06ED}')
}

fn glyph_em_width(ch: char) -> f64 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        '(' | ')' | '[' | ']' => 0.30,
        '\u{0640}' => 0.30,
        '\u{06DD}' => 1.00,
        '\u{06DE}' | '\u{06E9}' => 0.90,
        '\u{FDFD}' => 4.20,
        c if is_arabic_mark(c) => 0.0,
        c if c.is_ascii_digit() => 0.52,
        '\u{0660}'..='\u{0669}' => 0.52,
        c if c.is_ascii_punctuation() => 0.42,
        c if c.is_whitespace() => 0.32,
        _ => 0.56,
    }
}

/// Shaper running OpenType shaping through `harfrust`.
///
/// Words are shaped as Arabic (script `Arab`, language `ar`) so joining forms,
/// ligatures and mark positioning come from the font's GSUB/GPOS tables. The
/// resulting glyphs are already in visual order.
#[derive(Clone)]
pub struct FontShaper {
    data: Arc<[u8]>,
    index: u32,
    font_size: f64,
}

impl fmt::Debug for FontShaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontShaper")
            .field("bytes", &self.data.len())
            .field("index", &self.index)
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl FontShaper {
    /// Validate and keep font data.
    pub fn from_bytes(data: Vec<u8>, index: u32, font_size: f64) -> Result<Self, ShapeError> {
        harfrust::FontRef::from_index(&data, index)
            .map_err(|err| ShapeError::new(format!("invalid font data: {}", err)))?;
        Ok(Self {
            data: Arc::from(data),
            index,
            font_size,
        })
    }

    pub fn from_file(path: &Path, font_size: f64) -> Result<Self, ShapeError> {
        let data = fs::read(path)
            .map_err(|err| ShapeError::new(format!("reading {}: {}", path.display(), err)))?;
        Self::from_bytes(data, 0, font_size)
    }
}

impl Shaper for FontShaper {
    fn shape(&self, text: &str, direction: Direction) -> Result<ShapedRun, ShapeError> {
        let font = harfrust::FontRef::from_index(&self.data, self.index)
            .map_err(|err| ShapeError::new(err.to_string()).with_text(text))?;
        let shaper_data = harfrust::ShaperData::new(&font);
        let shaper = shaper_data.shaper(&font).build();
        let units_per_em = f64::from(shaper.units_per_em());
        if units_per_em <= 0.0 {
            return Err(ShapeError::new("font reports zero units per em").with_text(text));
        }
        let scale = self.font_size / units_per_em;

        let mut buffer = harfrust::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(match direction {
            Direction::LeftToRight => harfrust::Direction::LeftToRight,
            Direction::RightToLeft => harfrust::Direction::RightToLeft,
        });
        buffer.set_script(harfrust::script::ARABIC);
        if let Ok(language) = "ar".parse::<harfrust::Language>() {
            buffer.set_language(language);
        }
        let shaped = shaper.shape(buffer, &[]);

        let glyphs: SmallVec<[Glyph; 8]> = shaped
            .glyph_infos()
            .iter()
            .zip(shaped.glyph_positions())
            .map(|(info, pos)| {
                if info.glyph_id == 0 {
                    log::debug!("No glyph for cluster {} of '{}'", info.cluster, text);
                }
                Glyph {
                    id: info.glyph_id,
                    x_offset: f64::from(pos.x_offset) * scale,
                    y_offset: f64::from(pos.y_offset) * scale,
                    advance: f64::from(pos.x_advance) * scale,
                }
            })
            .collect();
        let advance = glyphs.iter().map(|g| g.advance).sum();
        Ok(ShapedRun {
            glyphs,
            advance,
            direction,
        })
    }
}

/// A shaped word ready to become a box.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedWord {
    pub text: String,
    pub run: Arc<ShapedRun>,
    /// Marks the start of a quarter.
    pub quarter: bool,
    /// Carries the prostration sign.
    pub prostration: bool,
}

impl ShapedWord {
    pub fn width(&self) -> f64 {
        self.run.advance
    }

    /// Invisible zero-width word that only carries the quarter flag.
    pub fn quarter_marker() -> Self {
        Self {
            text: String::new(),
            run: Arc::new(ShapedRun {
                glyphs: SmallVec::new(),
                advance: 0.0,
                direction: Direction::RightToLeft,
            }),
            quarter: true,
            prostration: false,
        }
    }

    pub fn has_marker(&self) -> bool {
        self.quarter || self.prostration
    }
}

/// Memoizing front end to a [`Shaper`], scoped to one document run.
pub struct ShapeCache {
    shaper: Arc<dyn Shaper>,
    runs: HashMap<String, Arc<ShapedRun>>,
    hits: usize,
}

impl fmt::Debug for ShapeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeCache")
            .field("entries", &self.runs.len())
            .field("hits", &self.hits)
            .finish()
    }
}

impl ShapeCache {
    pub fn new(shaper: Arc<dyn Shaper>) -> Self {
        Self {
            shaper,
            runs: HashMap::new(),
            hits: 0,
        }
    }

    /// Shape `text`, reusing an earlier run for the same string.
    pub fn run(&mut self, text: &str) -> Result<Arc<ShapedRun>, ShapeError> {
        if let Some(run) = self.runs.get(text) {
            self.hits += 1;
            return Ok(Arc::clone(run));
        }
        log::debug!("Shaping '{}'", text);
        let run = Arc::new(self.shaper.shape(text, Direction::for_word(text))?);
        self.runs.insert(text.to_string(), Arc::clone(&run));
        Ok(run)
    }

    /// Shape one word and flag prostration markers.
    pub fn shape_word(&mut self, word: &str) -> Result<ShapedWord, ShapeError> {
        if word.is_empty() {
            return Err(ShapeError::new("empty word"));
        }
        let run = self.run(word)?;
        Ok(ShapedWord {
            text: word.to_string(),
            run,
            quarter: false,
            prostration: word.starts_with(PROSTRATION_MARK),
        })
    }

    /// Natural width of an inter-word space.
    pub fn space_width(&mut self) -> Result<f64, ShapeError> {
        Ok(self.run(" ")?.advance)
    }

    /// Distinct strings shaped so far.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }
}
