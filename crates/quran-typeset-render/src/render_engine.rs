use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

use quran_typeset::{format_number, read_corpus, Chapter, ChapterSelection, CorpusError};

use crate::annotations::{MarginNote, QuarterTracker};
use crate::atoms::AtomSequence;
use crate::breaker::BreakError;
use crate::config::TypesetConfig;
use crate::lines::{Line, LineContent, LineItem};
use crate::pagination::{Page, PageComposer, PageItem};
use crate::paragraph::ParagraphComposer;
use crate::render_ir::{PageAnnotation, PageAnnotationKind, PageDocument, Point, Rect};
use crate::shaping::{HeuristicShaper, ShapeCache, ShapeError, Shaper};
use crate::surface::{Layer, PageRecorder, RenderSurface};

/// Frame offset from the text block.
const FRAME_OFFSET: f64 = 8.0;
/// Gap between the inner and outer frame.
const FRAME_GAP: f64 = 5.0;
const FRAME_INNER_WIDTH: f64 = 1.0;
const FRAME_OUTER_WIDTH: f64 = 3.0;
const HEADING_RULE_WIDTH: f64 = 0.5;
const CENTERING_EPSILON: f64 = 1e-6;

/// Failure of a typesetting run.
#[derive(Debug)]
pub enum TypesetError {
    /// Input corpus could not be loaded.
    Corpus(CorpusError),
    /// Content does not fit the configured geometry.
    Break(BreakError),
    /// A word could not be shaped.
    Shape(ShapeError),
    /// Output could not be written.
    Io(io::Error),
    /// Output could not be encoded.
    Serialize(String),
    /// Configuration could not be loaded.
    Config(String),
}

impl fmt::Display for TypesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corpus(err) => write!(f, "corpus: {}", err),
            Self::Break(err) => write!(f, "layout: {}", err),
            Self::Shape(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "io: {}", err),
            Self::Serialize(msg) => write!(f, "encoding output: {}", msg),
            Self::Config(msg) => write!(f, "config: {}", msg),
        }
    }
}

impl std::error::Error for TypesetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Corpus(err) => Some(err),
            Self::Break(err) => Some(err),
            Self::Shape(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialize(_) | Self::Config(_) => None,
        }
    }
}

impl From<CorpusError> for TypesetError {
    fn from(value: CorpusError) -> Self {
        Self::Corpus(value)
    }
}

impl From<BreakError> for TypesetError {
    fn from(value: BreakError) -> Self {
        Self::Break(value)
    }
}

impl From<ShapeError> for TypesetError {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<io::Error> for TypesetError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Counts reported after a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypesetSummary {
    pub chapters: usize,
    pub pages: usize,
    /// Lines drawn, headings included.
    pub lines: usize,
    pub quarter_marks: usize,
    pub prostration_marks: usize,
    /// Distinct strings shaped.
    pub shaped_words: usize,
}

/// Document driver: chapters to lines, lines to pages, pages to a surface.
///
/// Owns the shaping cache and the quarter counter for one document run.
#[derive(Debug)]
pub struct Typesetter {
    config: TypesetConfig,
    cache: ShapeCache,
    quarters: QuarterTracker,
}

impl Typesetter {
    pub fn new(config: TypesetConfig, shaper: Arc<dyn Shaper>) -> Self {
        Self {
            config: config.normalized(),
            cache: ShapeCache::new(shaper),
            quarters: QuarterTracker::new(),
        }
    }

    /// Typesetter measuring text with [`HeuristicShaper`] at the body size.
    pub fn with_heuristic_shaper(config: TypesetConfig) -> Self {
        let shaper = Arc::new(HeuristicShaper::new(config.font_size));
        Self::new(config, shaper)
    }

    pub fn config(&self) -> &TypesetConfig {
        &self.config
    }

    /// Value the next quarter marker will be labelled with.
    pub fn quarter_counter(&self) -> usize {
        self.quarters.counter()
    }

    /// Break every chapter into lines and concatenate them into one vertical
    /// sequence.
    pub fn compose_lines(
        &mut self,
        chapters: &[Chapter],
    ) -> Result<AtomSequence<Line>, TypesetError> {
        log::info!("Breaking text into lines…");
        let mut seq = AtomSequence::new();
        let mut composer = ParagraphComposer::new(&mut self.cache, &self.config);
        for chapter in chapters {
            for atom in composer.compose_chapter(chapter)? {
                seq.push(atom);
            }
        }
        Ok(seq)
    }

    pub fn compose_pages(&self, lines: AtomSequence<Line>) -> Result<Vec<Page>, TypesetError> {
        let composer = PageComposer::new(self.config.lines_per_page, self.config.leading);
        Ok(composer.compose(lines)?)
    }

    /// Draw pages in order.
    pub fn render<S: RenderSurface + ?Sized>(
        &mut self,
        pages: &[Page],
        surface: &mut S,
    ) -> Result<(), TypesetError> {
        log::info!("Drawing pages…");
        for page in pages {
            self.draw_page(page, surface)?;
        }
        Ok(())
    }

    /// Run the whole pipeline for `chapters`.
    pub fn typeset<S: RenderSurface + ?Sized>(
        &mut self,
        chapters: &[Chapter],
        surface: &mut S,
    ) -> Result<TypesetSummary, TypesetError> {
        let lines = self.compose_lines(chapters)?;
        let pages = self.compose_pages(lines)?;
        self.render(&pages, surface)?;

        Ok(TypesetSummary {
            chapters: chapters.len(),
            pages: pages.len(),
            lines: pages.iter().map(Page::line_count).sum(),
            quarter_marks: pages
                .iter()
                .flat_map(Page::lines)
                .map(Line::quarter_marks)
                .sum(),
            prostration_marks: pages
                .iter()
                .flat_map(Page::lines)
                .filter(|line| line.has_prostration())
                .count(),
            shaped_words: self.cache.len(),
        })
    }

    /// Typeset `chapters` into a recorded page document.
    pub fn typeset_document(&mut self, chapters: &[Chapter]) -> Result<PageDocument, TypesetError> {
        let mut recorder = PageRecorder::new(self.config.page_width, self.config.page_height);
        self.typeset(chapters, &mut recorder)?;
        Ok(recorder.into_document())
    }

    fn draw_page<S: RenderSurface + ?Sized>(
        &mut self,
        page: &Page,
        surface: &mut S,
    ) -> Result<(), TypesetError> {
        log::info!("Page {}…", page.number);
        surface.new_page(page.number);

        if page.line_count() == 0 {
            log::debug!("Leaving empty page blank");
            return Ok(());
        }

        let mut y = self.config.top_margin;
        let mut idx = 0usize;
        for item in &page.items {
            if let PageItem::Line(line) = item {
                let origin = Point::new(self.config.text_start_x(page.number, idx), y);
                draw_line(line, origin, self.config.text_width(idx), 1.0, &self.config, surface);
                if line.has_marker() {
                    self.draw_margin_note(page, idx, line, y, surface)?;
                }
                idx += 1;
            }
            y += item.height();
        }

        let number = self.cache.shape_word(&format_number(page.number))?;
        let x = self.config.page_number_x(page.number, number.width());
        surface.draw_box(
            &number,
            Point::new(x, self.config.page_number_ypos),
            1.0,
            Layer::Chrome,
        );

        if self.config.decorations {
            let cfg = &self.config;
            let x = cfg.text_start_x(page.number, 0) + FRAME_OFFSET;
            let y = cfg.top_margin - cfg.leading / 2.0 - FRAME_OFFSET;
            let w = cfg.text_width(0) + FRAME_OFFSET * 2.0;
            let h = cfg.page_height_target() + FRAME_OFFSET;
            let frame = Rect::new(x - w, y, w, h);
            surface.draw_rule(frame, FRAME_INNER_WIDTH, Layer::Chrome);
            surface.draw_rule(frame.outset(FRAME_GAP), FRAME_OUTER_WIDTH, Layer::Chrome);
        }
        Ok(())
    }

    /// Quarter and prostration labels in the outer margin, vertically centred
    /// on the line at `y`.
    fn draw_margin_note<S: RenderSurface + ?Sized>(
        &mut self,
        page: &Page,
        idx: usize,
        line: &Line,
        y: f64,
        surface: &mut S,
    ) -> Result<(), TypesetError> {
        // Every marker on the line advances the counter; the note shows the
        // first one.
        let marks = line.quarter_marks();
        let mut quarter = None;
        for _ in 0..marks {
            let label = self.quarters.advance();
            quarter.get_or_insert(label);
        }
        let note = MarginNote {
            quarter,
            prostration: line.has_prostration(),
        };
        if note.quarter.is_some() {
            log::debug!(
                "{} quarter marker(s) at page {}, next counter {}",
                marks,
                page.number,
                self.quarters.counter()
            );
            surface.annotate(PageAnnotation {
                kind: PageAnnotationKind::Quarter,
                value: Some(note.lines().join(" ")),
            });
        }
        if note.prostration {
            log::debug!("Prostration at page {}", page.number);
            surface.annotate(PageAnnotation {
                kind: PageAnnotationKind::Prostration,
                value: None,
            });
        }

        let mut composer = ParagraphComposer::new(&mut self.cache, &self.config);
        let mut rows = Vec::new();
        for text in note.lines() {
            rows.push(composer.set_line(&text)?);
        }

        let scale = self.config.note_scale;
        let leading = self.config.font_size;
        let widest = rows.iter().map(Line::width).fold(0.0, f64::max);
        let x = self.config.margin_note_x(page.number, idx, widest);
        let mut y = y - leading * rows.len() as f64 * scale / 2.0;
        for row in &rows {
            let offset = (widest - row.width()) * scale / 2.0;
            let right = x + offset + row.width() * scale;
            draw_items(row.items(), Point::new(right, y), scale, surface);
            y += leading;
        }
        Ok(())
    }
}

/// Draw a line whose right edge is `origin.x`; lines narrower than
/// `text_width` are centred in the text block.
fn draw_line<S: RenderSurface + ?Sized>(
    line: &Line,
    origin: Point,
    text_width: f64,
    scale: f64,
    cfg: &TypesetConfig,
    surface: &mut S,
) {
    match &line.content {
        LineContent::Text(items) => {
            let width = line.width();
            let mut right = origin.x;
            if (width - text_width).abs() > CENTERING_EPSILON {
                right -= (text_width - width) / 2.0;
            }
            draw_items(items, Point::new(right, origin.y), scale, surface);
        }
        LineContent::Heading(lines) => {
            let offset = cfg.leading / 2.0;
            let mut pos = origin;
            for sub in lines {
                draw_line(sub, pos, text_width, scale, cfg, surface);
                pos.y += sub.height - offset / 1.2;
            }
            let frame = Rect::new(
                origin.x - text_width,
                origin.y - offset,
                text_width,
                line.height - offset,
            );
            surface.draw_rule(frame, HEADING_RULE_WIDTH, Layer::Content);
        }
    }
}

/// Draw items right to left starting from the right edge `origin.x`.
fn draw_items<S: RenderSurface + ?Sized>(
    items: &[LineItem],
    origin: Point,
    scale: f64,
    surface: &mut S,
) {
    let mut x = origin.x;
    for item in items {
        x -= item.width() * scale;
        if let LineItem::Word(word) = item {
            surface.draw_box(word, Point::new(x, origin.y), scale, Layer::Content);
        }
    }
}

/// Load the selected chapters from `datadir` and typeset them.
pub fn typeset_corpus(
    datadir: &Path,
    selection: &ChapterSelection,
    config: TypesetConfig,
    shaper: Arc<dyn Shaper>,
) -> Result<PageDocument, TypesetError> {
    log::info!("Initializing the document from {}", datadir.display());
    let chapters = read_corpus(datadir, selection)?;
    let mut typesetter = Typesetter::new(config, shaper);
    typesetter.typeset_document(&chapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_ir::DrawCommand;
    use quran_typeset::ChapterMeta;

    fn chapter(number: usize, verses: &[&str]) -> Chapter {
        let meta = ChapterMeta {
            name: "الفاتحة".to_string(),
            place: "مكية".to_string(),
            opening: false,
            verses: None,
        };
        Chapter::from_verses(number, meta, verses)
    }

    /// Records only call order, for checking the driver's use of the surface.
    #[derive(Default)]
    struct CallLog {
        calls: Vec<String>,
    }

    impl RenderSurface for CallLog {
        fn new_page(&mut self, page_number: usize) {
            self.calls.push(format!("page {}", page_number));
        }

        fn draw_box(&mut self, word: &crate::shaping::ShapedWord, _: Point, _: f64, _: Layer) {
            self.calls.push(format!("box {}", word.text));
        }

        fn draw_rule(&mut self, _: Rect, line_width: f64, _: Layer) {
            self.calls.push(format!("rule {}", line_width));
        }
    }

    #[test]
    fn typeset_emits_heading_text_number_and_frame() {
        let mut typesetter = Typesetter::with_heuristic_shaper(TypesetConfig::default());
        let mut log = CallLog::default();
        let summary = typesetter
            .typeset(&[chapter(1, &["الحمد لله رب العالمين"])], &mut log)
            .expect("typeset");
        assert_eq!(summary.pages, 1);
        assert_eq!(summary.chapters, 1);
        assert_eq!(log.calls.first().map(String::as_str), Some("page 1"));
        assert!(log.calls.iter().any(|c| c == "rule 0.5"), "heading frame");
        assert!(log.calls.iter().any(|c| c == "box العالمين"));
        assert!(log.calls.iter().any(|c| c == "box ١"), "page number");
        let frames: Vec<&String> = log.calls.iter().filter(|c| c.starts_with("rule ")).collect();
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn decorations_can_be_disabled() {
        let config = TypesetConfig {
            decorations: false,
            ..TypesetConfig::default()
        };
        let mut typesetter = Typesetter::with_heuristic_shaper(config);
        let document = typesetter
            .typeset_document(&[chapter(1, &["الحمد لله"])])
            .expect("typeset");
        assert_eq!(document.pages.len(), 1);
        let rules = document.pages[0]
            .chrome_commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Rule(_)))
            .count();
        assert_eq!(rules, 0);
    }

    #[test]
    fn short_lines_are_centred_in_the_text_block() {
        let mut typesetter = Typesetter::with_heuristic_shaper(TypesetConfig::default());
        let document = typesetter
            .typeset_document(&[chapter(1, &["لله"])])
            .expect("typeset");
        let cfg = TypesetConfig::default();
        let word = HeuristicShaper::new(cfg.font_size)
            .shape("لله", crate::shaping::Direction::RightToLeft)
            .expect("shape");
        let expected =
            cfg.text_start_x(1, 1) - (cfg.text_width(1) - word.advance) / 2.0 - word.advance;
        let found = document.pages[0].content_commands.iter().any(|cmd| match cmd {
            DrawCommand::Glyphs(run) => run.text == "لله" && (run.x - expected).abs() < 1e-9,
            DrawCommand::Rule(_) => false,
        });
        assert!(found, "centred body line");
    }

    #[test]
    fn quarter_lines_advance_the_counter_and_annotate() {
        let mut typesetter = Typesetter::with_heuristic_shaper(TypesetConfig::default());
        let document = typesetter
            .typeset_document(&[
                chapter(2, &["\u{06DE}\u{00A0}الم"]),
                chapter(3, &["\u{06DE}\u{00A0}الم"]),
            ])
            .expect("typeset");
        assert_eq!(typesetter.quarter_counter(), 3);
        let annotations: Vec<&PageAnnotation> =
            document.pages.iter().flat_map(|p| p.annotations.iter()).collect();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].value.as_deref(), Some("ربع الحزب"));
        assert_eq!(annotations[1].value.as_deref(), Some("نصف الحزب"));
    }

    #[test]
    fn each_marker_on_a_shared_line_advances_the_counter() {
        let mut typesetter = Typesetter::with_heuristic_shaper(TypesetConfig::default());
        let chapters = [chapter(2, &["\u{06DE}\u{00A0}الم ذلك \u{06DE}\u{00A0}الكتاب"])];
        let mut recorder = PageRecorder::new(396.0, 540.0);
        let summary = typesetter.typeset(&chapters, &mut recorder).expect("typeset");
        assert_eq!(summary.lines, 2, "heading and one body line");
        assert_eq!(summary.quarter_marks, 2);
        assert_eq!(typesetter.quarter_counter(), 3);

        let annotations: Vec<&PageAnnotation> = recorder
            .pages()
            .iter()
            .flat_map(|p| p.annotations.iter())
            .collect();
        assert_eq!(annotations.len(), 1, "one note per line");
        assert_eq!(annotations[0].value.as_deref(), Some("ربع الحزب"));
    }
}
