//! Errors raised while loading the chapter corpus.

use core::fmt;

/// Stable classification of corpus failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CorpusErrorCode {
    /// The metadata table file does not exist.
    MetaMissing,
    /// A metadata row could not be parsed.
    MetaParse,
    /// A requested chapter text file does not exist.
    ChapterMissing,
    /// A chapter text file exists but could not be read.
    ChapterRead,
    /// A chapter number outside `1..=114` was requested.
    ChapterRange,
}

impl CorpusErrorCode {
    /// Machine-readable code string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MetaMissing => "META_MISSING",
            Self::MetaParse => "META_PARSE",
            Self::ChapterMissing => "CHAPTER_MISSING",
            Self::ChapterRead => "CHAPTER_READ",
            Self::ChapterRange => "CHAPTER_RANGE",
        }
    }
}

/// Corpus loading error with optional path and chapter context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusError {
    /// Failure class.
    pub code: CorpusErrorCode,
    /// Human-readable message.
    pub message: Box<str>,
    /// File the failure relates to, when known.
    pub path: Option<Box<str>>,
    /// Chapter number (1-based), when known.
    pub chapter: Option<usize>,
    /// Line number in the metadata table (1-based), when known.
    pub line: Option<usize>,
}

impl CorpusError {
    pub(crate) fn new(code: CorpusErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into().into_boxed_str(),
            path: None,
            chapter: None,
            line: None,
        }
    }

    pub(crate) fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into().into_boxed_str());
        self
    }

    pub(crate) fn with_chapter(mut self, chapter: usize) -> Self {
        self.chapter = Some(chapter);
        self
    }

    pub(crate) fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for CorpusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)?;
        if let Some(chapter) = self.chapter {
            write!(f, " (chapter {})", chapter)?;
        }
        if let Some(path) = &self.path {
            write!(f, " [{}", path)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl std::error::Error for CorpusError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_context() {
        let err = CorpusError::new(CorpusErrorCode::MetaParse, "missing place column")
            .with_path("data/meta.txt")
            .with_line(3);
        assert_eq!(
            err.to_string(),
            "META_PARSE: missing place column [data/meta.txt:3]"
        );

        let err = CorpusError::new(CorpusErrorCode::ChapterMissing, "file not found")
            .with_chapter(2)
            .with_path("data/002.txt");
        assert_eq!(
            err.to_string(),
            "CHAPTER_MISSING: file not found (chapter 2) [data/002.txt]"
        );
    }
}
