//! Chapter text to justified lines.
//!
//! Words are shaped through the document's [`ShapeCache`] and set as boxes
//! separated by space glue; the breaker then wraps them against the
//! configured text widths and each line's glue is resolved with that line's
//! adjustment ratio.

use quran_typeset::markers::{
    is_word_separator, starts_with_quarter, NO_BREAK_SPACE, OPENING_INVOCATION, QUARTER_MARK,
};
use quran_typeset::Chapter;

use crate::atoms::{Atom, AtomSequence, Glue, Penalty};
use crate::breaker::{breakpoints, compute_adjustment_ratio, BreakMode};
use crate::config::TypesetConfig;
use crate::lines::{Line, LineItem};
use crate::render_engine::TypesetError;
use crate::shaping::{ShapeCache, ShapedWord};

/// Builds and breaks paragraphs for one document run.
pub struct ParagraphComposer<'a> {
    cache: &'a mut ShapeCache,
    config: &'a TypesetConfig,
}

impl<'a> ParagraphComposer<'a> {
    pub fn new(cache: &'a mut ShapeCache, config: &'a TypesetConfig) -> Self {
        Self { cache, config }
    }

    /// Inter-word glue derived from the shaped space width.
    pub fn space_glue(&mut self) -> Result<Glue, TypesetError> {
        let space = self.cache.space_width()?;
        Ok(Glue::new(space, space / 2.0, space / 1.5))
    }

    /// Segment `text` into word boxes and space glue, closed for breaking.
    ///
    /// A quarter marker opening the text becomes an invisible marker box with
    /// no space after it. A no-break space keeps its glue but forbids a break
    /// there.
    pub fn atoms(&mut self, text: &str) -> Result<AtomSequence<ShapedWord>, TypesetError> {
        let glue = self.space_glue()?;
        let mut text = text.trim();
        let mut seq = AtomSequence::with_capacity(text.len() / 3);

        if starts_with_quarter(text) {
            seq.push_box(0.0, ShapedWord::quarter_marker());
            text = &text[QUARTER_MARK.len_utf8() + NO_BREAK_SPACE.len_utf8()..];
        }

        let mut word_start: Option<usize> = None;
        for (idx, ch) in text.char_indices() {
            if !is_word_separator(ch) {
                word_start.get_or_insert(idx);
                continue;
            }
            if let Some(start) = word_start.take() {
                self.push_word(&mut seq, &text[start..idx])?;
            }
            if !seq.atoms().last().is_some_and(Atom::is_box) {
                continue;
            }
            if ch == NO_BREAK_SPACE {
                seq.push_penalty(Penalty::forbidden());
            }
            seq.push_glue(glue);
        }
        if let Some(start) = word_start {
            self.push_word(&mut seq, &text[start..])?;
        }

        seq.close_paragraph();
        Ok(seq)
    }

    fn push_word(
        &mut self,
        seq: &mut AtomSequence<ShapedWord>,
        word: &str,
    ) -> Result<(), TypesetError> {
        let mut shaped = self.cache.shape_word(word)?;
        if word.starts_with(QUARTER_MARK) {
            shaped.quarter = true;
        }
        seq.push_box(shaped.width(), shaped);
        Ok(())
    }

    /// Break `text` into justified lines of the configured widths.
    pub fn break_lines(&mut self, text: &str) -> Result<Vec<Line>, TypesetError> {
        let seq = self.atoms(text)?;
        let targets = &self.config.text_widths;
        let breaks = breakpoints(&seq, targets, BreakMode::Tolerance(self.config.tolerance))?;

        let ratios: Vec<_> = breaks
            .segments()
            .map(|s| (s, compute_adjustment_ratio(&seq, s.start, s.end, s.line, targets)))
            .collect();

        let mut atoms = seq.into_atoms().into_iter().enumerate();
        let mut lines = Vec::with_capacity(ratios.len());
        for (segment, ratio) in ratios {
            let mut items = Vec::new();
            for (idx, atom) in atoms.by_ref() {
                if idx >= segment.end {
                    break;
                }
                match atom {
                    Atom::Box { content, .. } => items.push(LineItem::Word(content)),
                    Atom::Glue(glue) => items.push(LineItem::Space {
                        glue,
                        width: glue.resolve(ratio),
                    }),
                    Atom::Penalty(_) => {}
                }
            }
            let line = Line::text(items, self.config.leading);
            if line.words().next().is_some() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    /// Set a short run of text on one line at natural spacing.
    pub fn set_line(&mut self, text: &str) -> Result<Line, TypesetError> {
        let glue = self.space_glue()?;
        let mut items = Vec::new();
        for word in text.split(is_word_separator).filter(|w| !w.is_empty()) {
            if !items.is_empty() {
                items.push(LineItem::Space {
                    glue,
                    width: glue.natural,
                });
            }
            items.push(LineItem::Word(self.cache.shape_word(word)?));
        }
        Ok(Line::text(items, self.config.leading))
    }

    /// Two-line chapter heading.
    pub fn heading(&mut self, chapter: &Chapter) -> Result<Line, TypesetError> {
        let mut lines = Vec::with_capacity(2);
        for text in chapter.heading_text_with(self.config.heading_style) {
            lines.push(self.set_line(&text)?);
        }
        Ok(Line::heading(
            lines,
            self.config.leading * self.config.heading_factor,
        ))
    }

    /// Vertical atoms for a whole chapter: heading, optional opening
    /// invocation, then body lines separated by zero-height glue.
    ///
    /// Every chapter ends with glue that can stretch by one leading, so that
    /// chapter boundaries absorb the slack of a justified page and a page can
    /// break after any chapter, including one with no body text.
    pub fn compose_chapter(&mut self, chapter: &Chapter) -> Result<Vec<Atom<Line>>, TypesetError> {
        log::info!("Chapter {}…", chapter.number);

        let heading = self.heading(chapter)?;
        let mut out = vec![Atom::boxed(heading.height, heading)];
        if chapter.has_opening() {
            let opening = self.set_line(&OPENING_INVOCATION.to_string())?;
            out.push(Atom::boxed(opening.height, opening));
        }

        for (idx, line) in self.break_lines(&chapter.text)?.into_iter().enumerate() {
            if idx > 0 {
                out.push(Atom::Glue(Glue::fixed(0.0)));
            }
            out.push(Atom::boxed(line.height, line));
        }
        out.push(Atom::Glue(Glue::new(0.0, self.config.leading, 0.0)));
        Ok(out)
    }
}
