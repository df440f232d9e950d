use core::fmt;

use serde::{Deserialize, Serialize};

use crate::shaping::{Direction, Glyph};

type LayerCommandIter<'a> =
    core::iter::Chain<core::slice::Iter<'a, DrawCommand>, core::slice::Iter<'a, DrawCommand>>;

/// Iterator over a page's content then chrome commands.
pub struct MergedCommandIter<'a>(LayerCommandIter<'a>);

impl<'a> Iterator for MergedCommandIter<'a> {
    type Item = &'a DrawCommand;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Page represented as backend-agnostic draw commands.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderPage {
    /// 1-based page number.
    pub page_number: usize,
    /// Text and heading frames.
    pub content_commands: Vec<DrawCommand>,
    /// Page number and decorations.
    pub chrome_commands: Vec<DrawCommand>,
    /// Structured non-draw annotations associated with this page.
    pub annotations: Vec<PageAnnotation>,
}

impl RenderPage {
    const INITIAL_CONTENT_COMMAND_CAPACITY: usize = 64;
    const INITIAL_CHROME_COMMAND_CAPACITY: usize = 3;

    /// Create an empty page.
    pub fn new(page_number: usize) -> Self {
        Self {
            page_number,
            // Blank pages stay allocation-free.
            content_commands: Vec::with_capacity(0),
            chrome_commands: Vec::with_capacity(0),
            annotations: Vec::with_capacity(0),
        }
    }

    /// Push a content-layer command.
    pub fn push_content_command(&mut self, cmd: DrawCommand) {
        if self.content_commands.capacity() == 0 {
            self.content_commands
                .reserve(Self::INITIAL_CONTENT_COMMAND_CAPACITY);
        }
        self.content_commands.push(cmd);
    }

    /// Push a chrome-layer command.
    pub fn push_chrome_command(&mut self, cmd: DrawCommand) {
        if self.chrome_commands.capacity() == 0 {
            self.chrome_commands
                .reserve(Self::INITIAL_CHROME_COMMAND_CAPACITY);
        }
        self.chrome_commands.push(cmd);
    }

    pub fn push_annotation(&mut self, annotation: PageAnnotation) {
        self.annotations.push(annotation);
    }

    /// Number of commands across both layers.
    pub fn merged_commands_len(&self) -> usize {
        self.content_commands.len() + self.chrome_commands.len()
    }

    /// Iterate content then chrome commands without allocating.
    pub fn merged_commands_iter(&self) -> MergedCommandIter<'_> {
        MergedCommandIter(
            self.content_commands
                .iter()
                .chain(self.chrome_commands.iter()),
        )
    }

    /// True when nothing is drawn on the page.
    pub fn is_blank(&self) -> bool {
        self.merged_commands_len() == 0
    }
}

/// Structured page annotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAnnotation {
    /// Stable annotation kind/tag.
    pub kind: PageAnnotationKind,
    /// Optional annotation payload.
    pub value: Option<String>,
}

/// Structured page annotation kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageAnnotationKind {
    /// Quarter, group or part boundary.
    Quarter,
    /// Prostration verse.
    Prostration,
    /// Forward-compatible fallback for unknown tags.
    Unknown(String),
}

impl PageAnnotationKind {
    /// Canonical string form used by persisted payloads.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Quarter => "quarter",
            Self::Prostration => "prostration",
            Self::Unknown(value) => value.as_str(),
        }
    }
}

impl From<&str> for PageAnnotationKind {
    fn from(value: &str) -> Self {
        match value {
            "quarter" => Self::Quarter,
            "prostration" => Self::Prostration,
            _ => Self::Unknown(value.to_string()),
        }
    }
}

impl From<String> for PageAnnotationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "quarter" => Self::Quarter,
            "prostration" => Self::Prostration,
            _ => Self::Unknown(value),
        }
    }
}

impl From<PageAnnotationKind> for String {
    fn from(value: PageAnnotationKind) -> Self {
        match value {
            PageAnnotationKind::Unknown(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl PartialEq<&str> for PageAnnotationKind {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for PageAnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point in page coordinates (origin top-left, y down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left x.
    pub x: f64,
    /// Top y.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow (positive) or shrink (negative) on every side.
    pub fn outset(&self, by: f64) -> Self {
        Self {
            x: self.x - by,
            y: self.y - by,
            width: self.width + by * 2.0,
            height: self.height + by * 2.0,
        }
    }
}

/// Layout output commands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Draw a shaped glyph run.
    Glyphs(GlyphRunCommand),
    /// Stroke a rectangle outline.
    Rule(RuleCommand),
}

/// Glyph run draw command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphRunCommand {
    /// Left edge of the run.
    pub x: f64,
    /// Baseline y.
    pub baseline_y: f64,
    /// Scale relative to the body size.
    pub scale: f64,
    /// Source text of the run.
    pub text: String,
    pub direction: Direction,
    /// Glyphs in visual order.
    pub glyphs: Vec<Glyph>,
}

/// Rectangle outline command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleCommand {
    pub rect: Rect,
    pub line_width: f64,
}

/// Whole typeset document: fixed page size plus pages in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<RenderPage>,
}

#[cfg(test)]
mod tests {
    use super::{DrawCommand, PageAnnotationKind, Rect, RenderPage, RuleCommand};

    #[test]
    fn page_annotation_kind_maps_known_tags() {
        assert_eq!(
            PageAnnotationKind::from("quarter"),
            PageAnnotationKind::Quarter
        );
        assert_eq!(
            PageAnnotationKind::from("prostration"),
            PageAnnotationKind::Prostration
        );
        assert_eq!(String::from(PageAnnotationKind::Quarter), "quarter");
    }

    #[test]
    fn page_annotation_kind_preserves_unknown_tags() {
        let kind = PageAnnotationKind::from("custom_annotation");
        assert_eq!(
            kind,
            PageAnnotationKind::Unknown("custom_annotation".to_string())
        );
        assert_eq!(kind, "custom_annotation");
        assert_eq!(kind.to_string(), "custom_annotation");
    }

    #[test]
    fn render_page_merged_commands_iter_reads_both_layers() {
        let mut page = RenderPage::new(1);
        assert!(page.is_blank());
        page.push_content_command(DrawCommand::Rule(RuleCommand {
            rect: Rect::new(0.0, 0.0, 10.0, 5.0),
            line_width: 0.5,
        }));
        page.push_chrome_command(DrawCommand::Rule(RuleCommand {
            rect: Rect::new(1.0, 1.0, 8.0, 3.0),
            line_width: 1.0,
        }));
        assert_eq!(page.merged_commands_len(), 2);
        assert_eq!(page.merged_commands_iter().count(), 2);
        assert!(!page.is_blank());
    }

    #[test]
    fn render_page_new_defers_vector_allocations() {
        let page = RenderPage::new(1);
        assert_eq!(page.content_commands.capacity(), 0);
        assert_eq!(page.chrome_commands.capacity(), 0);
        assert_eq!(page.annotations.capacity(), 0);
    }

    #[test]
    fn outset_grows_every_side() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0).outset(5.0);
        assert_eq!(rect, Rect::new(5.0, 15.0, 40.0, 50.0));
    }

    #[test]
    fn annotation_kind_serializes_as_tag() {
        let json = serde_json::to_string(&PageAnnotationKind::Prostration).expect("serialize");
        assert_eq!(json, "\"prostration\"");
        let back: PageAnnotationKind = serde_json::from_str("\"other\"").expect("deserialize");
        assert_eq!(back, PageAnnotationKind::Unknown("other".to_string()));
    }
}
