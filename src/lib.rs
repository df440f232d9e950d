//! Input corpus and text vocabulary for `quran-typeset`.
//!
//! This crate knows how chapter text is stored on disk and which characters
//! carry typesetting meaning (quarter and prostration markers, the verse-end
//! sign, the no-break space). Layout lives in `quran-typeset-render`.

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

pub mod corpus;
pub mod error;
pub mod markers;
pub mod numerals;

pub use corpus::{
    chapter_path, read_corpus, read_metadata, select_chapters, Chapter, ChapterMeta,
    ChapterSelection, HeadingStyle, MetadataTable, CHAPTER_COUNT,
};
pub use error::{CorpusError, CorpusErrorCode};
pub use numerals::{format_number, number_words, NumberCase};
