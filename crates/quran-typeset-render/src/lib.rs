//! Line breaking, page composition and drawing for `quran-typeset`.
//!
//! Text is modelled as boxes, glue and penalties. The same breaker sets
//! words into justified lines and lines into fixed-height pages; the
//! [`Typesetter`] then draws every page onto a [`RenderSurface`].

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod annotations;
mod atoms;
mod breaker;
mod config;
mod lines;
mod pagination;
mod paragraph;
mod render_engine;
mod render_ir;
mod shaping;
mod surface;

pub use annotations::{MarginNote, QuarterLabel, QuarterTracker};
pub use atoms::{Atom, AtomSequence, Glue, Penalty, RangeMetrics, INFINITY};
pub use breaker::{
    breakpoints, compute_adjustment_ratio, target_length, BreakError, BreakMode, Breakpoints,
    Segment,
};
pub use config::TypesetConfig;
pub use lines::{Line, LineContent, LineItem};
pub use pagination::{Page, PageComposer, PageItem};
pub use paragraph::ParagraphComposer;
pub use render_engine::{typeset_corpus, TypesetError, TypesetSummary, Typesetter};
pub use render_ir::{
    DrawCommand, GlyphRunCommand, MergedCommandIter, PageAnnotation, PageAnnotationKind,
    PageDocument, Point, Rect, RenderPage, RuleCommand,
};
pub use shaping::{
    Direction, FontShaper, Glyph, HeuristicShaper, ShapeCache, ShapeError, ShapedRun, ShapedWord,
    Shaper,
};
pub use surface::{
    decode_document, encode_document, write_document, Layer, OutputFormat, PageRecorder,
    RenderSurface,
};
