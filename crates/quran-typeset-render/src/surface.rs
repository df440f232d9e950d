//! Drawing seam and the page-description writer.
//!
//! [`PageRecorder`] is the in-tree [`RenderSurface`]: it records every draw
//! call as a render IR command so the whole document can be serialised as
//! JSON or postcard.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::render_engine::TypesetError;
use crate::render_ir::{
    DrawCommand, GlyphRunCommand, PageAnnotation, PageDocument, Point, Rect, RenderPage,
    RuleCommand,
};
use crate::shaping::ShapedWord;

/// Target layer of a draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Body text and heading frames.
    Content,
    /// Page number and decorations.
    Chrome,
}

/// Consumer of drawing operations, one page at a time.
pub trait RenderSurface {
    /// Start page `page_number`. Later calls draw onto it.
    fn new_page(&mut self, page_number: usize);

    /// Draw a shaped word with its left baseline point at `origin`.
    fn draw_box(&mut self, word: &ShapedWord, origin: Point, scale: f64, layer: Layer);

    /// Stroke the outline of `rect`.
    fn draw_rule(&mut self, rect: Rect, line_width: f64, layer: Layer);

    /// Attach non-drawing metadata to the current page.
    fn annotate(&mut self, _annotation: PageAnnotation) {}
}

/// Surface that records pages as render IR.
#[derive(Clone, Debug, Default)]
pub struct PageRecorder {
    document: PageDocument,
}

impl PageRecorder {
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            document: PageDocument {
                page_width,
                page_height,
                pages: Vec::new(),
            },
        }
    }

    pub fn pages(&self) -> &[RenderPage] {
        &self.document.pages
    }

    pub fn into_document(self) -> PageDocument {
        self.document
    }

    fn current(&mut self) -> &mut RenderPage {
        if self.document.pages.is_empty() {
            log::warn!("Drawing before the first page; starting page 1");
            self.document.pages.push(RenderPage::new(1));
        }
        let last = self.document.pages.len() - 1;
        &mut self.document.pages[last]
    }

    fn push(&mut self, cmd: DrawCommand, layer: Layer) {
        let page = self.current();
        match layer {
            Layer::Content => page.push_content_command(cmd),
            Layer::Chrome => page.push_chrome_command(cmd),
        }
    }
}

impl RenderSurface for PageRecorder {
    fn new_page(&mut self, page_number: usize) {
        self.document.pages.push(RenderPage::new(page_number));
    }

    fn draw_box(&mut self, word: &ShapedWord, origin: Point, scale: f64, layer: Layer) {
        if word.run.glyphs.is_empty() {
            return;
        }
        self.push(
            DrawCommand::Glyphs(GlyphRunCommand {
                x: origin.x,
                baseline_y: origin.y,
                scale,
                text: word.text.clone(),
                direction: word.run.direction,
                glyphs: word.run.glyphs.to_vec(),
            }),
            layer,
        );
    }

    fn draw_rule(&mut self, rect: Rect, line_width: f64, layer: Layer) {
        self.push(DrawCommand::Rule(RuleCommand { rect, line_width }), layer);
    }

    fn annotate(&mut self, annotation: PageAnnotation) {
        self.current().push_annotation(annotation);
    }
}

/// Serialisation of the page-description document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    /// Compact binary encoding.
    Postcard,
}

impl OutputFormat {
    /// Pick a format from the output file extension; JSON unless the
    /// extension names postcard.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("postcard") | Some("pc") | Some("bin") => Self::Postcard,
            _ => Self::Json,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Postcard => "postcard",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "postcard" | "bin" => Ok(Self::Postcard),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Encode a document in `format`.
pub fn encode_document(
    document: &PageDocument,
    format: OutputFormat,
) -> Result<Vec<u8>, TypesetError> {
    match format {
        OutputFormat::Json => serde_json::to_vec_pretty(document)
            .map_err(|err| TypesetError::Serialize(err.to_string())),
        OutputFormat::Postcard => postcard::to_allocvec(document)
            .map_err(|err| TypesetError::Serialize(err.to_string())),
    }
}

/// Decode a document previously written with [`encode_document`].
pub fn decode_document(bytes: &[u8], format: OutputFormat) -> Result<PageDocument, TypesetError> {
    match format {
        OutputFormat::Json => {
            serde_json::from_slice(bytes).map_err(|err| TypesetError::Serialize(err.to_string()))
        }
        OutputFormat::Postcard => {
            postcard::from_bytes(bytes).map_err(|err| TypesetError::Serialize(err.to_string()))
        }
    }
}

/// Write the document to `path`, replacing any existing file.
pub fn write_document(
    document: &PageDocument,
    path: &Path,
    format: OutputFormat,
) -> Result<(), TypesetError> {
    let payload = encode_document(document, format)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&payload)?;
    writer.flush()?;
    log::info!(
        "Wrote {} pages to {} ({})",
        document.pages.len(),
        path.display(),
        format.as_str()
    );
    Ok(())
}
