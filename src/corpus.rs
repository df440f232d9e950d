//! Chapter text and metadata loading.
//!
//! A corpus directory holds one `meta.txt` table plus one text file per
//! chapter, named by the zero-padded chapter number (`001.txt` .. `114.txt`).
//! Each line of a chapter file is one verse. Each row of the table describes
//! the chapter whose number equals the row number, as tab-separated columns:
//!
//! ```text
//! NAME <TAB> PLACE [<TAB> OPENING(0|1) [<TAB> VERSES]]
//! ```
//!
//! `OPENING` defaults to `1` (the chapter is preceded by the opening
//! invocation). `VERSES` overrides the verse count otherwise derived from the
//! number of lines in the chapter file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, CorpusErrorCode};
use crate::markers::{NO_BREAK_SPACE, PROSTRATION_MARK, QUARTER_MARK};
use crate::numerals::{format_number, number_words, NumberCase};

/// Number of chapters in the corpus.
pub const CHAPTER_COUNT: usize = 114;

const META_FILE: &str = "meta.txt";

/// How numbers are written in chapter headings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// Arabic-Indic digits.
    #[default]
    Digits,
    /// Verse count spelled out in words.
    Words,
}

/// Per-chapter metadata row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMeta {
    /// Chapter name.
    pub name: String,
    /// Place of revelation.
    pub place: String,
    /// Whether the chapter is preceded by the opening invocation.
    pub opening: bool,
    /// Verse count override.
    pub verses: Option<usize>,
}

/// Parsed metadata table keyed by chapter number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataTable {
    rows: BTreeMap<usize, ChapterMeta>,
}

impl MetadataTable {
    /// Parse a tab-separated metadata table.
    pub fn parse(source: &str) -> Result<Self, CorpusError> {
        let mut rows = BTreeMap::new();
        for (idx, raw) in source.lines().enumerate() {
            let number = idx + 1;
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').map(str::trim).collect();
            if cols.len() < 2 || cols[0].is_empty() {
                return Err(CorpusError::new(
                    CorpusErrorCode::MetaParse,
                    "expected at least name and place columns",
                )
                .with_line(number));
            }
            let opening = match cols.get(2).filter(|c| !c.is_empty()) {
                None => true,
                Some(col) => col.parse::<u8>().map(|v| v != 0).map_err(|_| {
                    CorpusError::new(
                        CorpusErrorCode::MetaParse,
                        format!("invalid opening flag '{}'", col),
                    )
                    .with_line(number)
                })?,
            };
            let verses = match cols.get(3).filter(|c| !c.is_empty()) {
                None => None,
                Some(col) => Some(col.parse::<usize>().map_err(|_| {
                    CorpusError::new(
                        CorpusErrorCode::MetaParse,
                        format!("invalid verse count '{}'", col),
                    )
                    .with_line(number)
                })?),
            };
            rows.insert(
                number,
                ChapterMeta {
                    name: cols[0].to_string(),
                    place: cols[1].to_string(),
                    opening,
                    verses,
                },
            );
        }
        Ok(Self { rows })
    }

    /// Metadata for a chapter (1-based).
    pub fn get(&self, chapter: usize) -> Option<&ChapterMeta> {
        self.rows.get(&chapter)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One chapter of input text with its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter number (1-based).
    pub number: usize,
    /// Metadata row.
    pub meta: ChapterMeta,
    /// Display text: the chapter's verses joined by single spaces.
    pub text: String,
    /// Verse count (metadata override, else the number of verse lines).
    pub verses: usize,
}

impl Chapter {
    /// Build a chapter from its verse lines.
    pub fn from_verses<S: AsRef<str>>(number: usize, meta: ChapterMeta, verses: &[S]) -> Self {
        let mut text = String::with_capacity(verses.iter().map(|v| v.as_ref().len() + 1).sum());
        for (idx, verse) in verses.iter().enumerate() {
            if idx > 0 {
                text.push(' ');
            }
            text.push_str(verse.as_ref());
        }
        let count = meta.verses.unwrap_or(verses.len());
        Self {
            number,
            meta,
            text,
            verses: count,
        }
    }

    /// Whether the chapter is preceded by the opening invocation.
    pub fn has_opening(&self) -> bool {
        self.meta.opening
    }

    /// The two heading lines: title with number, name and place; verse count.
    pub fn heading_text(&self) -> [String; 2] {
        self.heading_text_with(HeadingStyle::Digits)
    }

    /// Heading lines with the verse count written in `style`.
    pub fn heading_text_with(&self, style: HeadingStyle) -> [String; 2] {
        let verses = match style {
            HeadingStyle::Digits => format_number(self.verses),
            HeadingStyle::Words => number_words(self.verses, NumberCase::Nominative, false)
                .unwrap_or_else(|| format_number(self.verses)),
        };
        [
            format!(
                "({}) سورة {} {}",
                format_number(self.number),
                self.meta.name,
                self.meta.place
            ),
            format!("و آياتها {}", verses),
        ]
    }

    /// Number of quarter markers in the chapter text.
    pub fn quarter_marks(&self) -> usize {
        let mut count = 0usize;
        let mut prev: Option<char> = None;
        for ch in self.text.chars() {
            if prev == Some(QUARTER_MARK) && ch == NO_BREAK_SPACE {
                count += 1;
            }
            prev = Some(ch);
        }
        count
    }

    /// Number of prostration markers in the chapter text.
    pub fn prostration_marks(&self) -> usize {
        self.text.chars().filter(|c| *c == PROSTRATION_MARK).count()
    }
}

/// Validated, ordered list of chapter numbers to typeset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterSelection(Vec<usize>);

impl ChapterSelection {
    /// All chapters in order.
    pub fn all() -> Self {
        Self((1..=CHAPTER_COUNT).collect())
    }

    /// Selected chapter numbers, in request order.
    pub fn numbers(&self) -> &[usize] {
        &self.0
    }
}

impl Default for ChapterSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Validate requested chapter numbers; an empty request selects everything.
pub fn select_chapters(requested: &[usize]) -> Result<ChapterSelection, CorpusError> {
    if requested.is_empty() {
        return Ok(ChapterSelection::all());
    }
    for &number in requested {
        if !(1..=CHAPTER_COUNT).contains(&number) {
            return Err(CorpusError::new(
                CorpusErrorCode::ChapterRange,
                format!("chapter must be in 1..={}", CHAPTER_COUNT),
            )
            .with_chapter(number));
        }
    }
    Ok(ChapterSelection(requested.to_vec()))
}

/// Path of a chapter's text file inside `datadir`.
pub fn chapter_path(datadir: &Path, chapter: usize) -> PathBuf {
    datadir.join(format!("{:03}.txt", chapter))
}

/// Read and parse `meta.txt` from `datadir`.
pub fn read_metadata(datadir: &Path) -> Result<MetadataTable, CorpusError> {
    let path = datadir.join(META_FILE);
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(
            CorpusError::new(CorpusErrorCode::MetaMissing, "file not found").with_path(display),
        );
    }
    let source = fs::read_to_string(&path).map_err(|err| {
        CorpusError::new(CorpusErrorCode::MetaParse, err.to_string()).with_path(display.clone())
    })?;
    MetadataTable::parse(&source).map_err(|err| err.with_path(display))
}

/// Load the selected chapters from `datadir`.
///
/// Every input file is checked before any chapter is read, so a missing file
/// fails the run before layout starts.
pub fn read_corpus(
    datadir: &Path,
    selection: &ChapterSelection,
) -> Result<Vec<Chapter>, CorpusError> {
    let metadata = read_metadata(datadir)?;

    for &number in selection.numbers() {
        let path = chapter_path(datadir, number);
        if !path.is_file() {
            return Err(CorpusError::new(CorpusErrorCode::ChapterMissing, "file not found")
                .with_chapter(number)
                .with_path(path.display().to_string()));
        }
        if metadata.get(number).is_none() {
            return Err(CorpusError::new(
                CorpusErrorCode::MetaParse,
                "no metadata row for chapter",
            )
            .with_chapter(number)
            .with_path(datadir.join(META_FILE).display().to_string()));
        }
    }

    let mut chapters = Vec::with_capacity(selection.numbers().len());
    for &number in selection.numbers() {
        let path = chapter_path(datadir, number);
        let source = fs::read_to_string(&path).map_err(|err| {
            CorpusError::new(CorpusErrorCode::ChapterRead, err.to_string())
                .with_chapter(number)
                .with_path(path.display().to_string())
        })?;
        let verses: Vec<&str> = source
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();
        let meta = match metadata.get(number) {
            Some(meta) => meta.clone(),
            None => continue,
        };
        let chapter = Chapter::from_verses(number, meta, &verses);
        log::debug!(
            "Loaded chapter {} ({} verses, {} quarter marks)",
            number,
            chapter.verses,
            chapter.quarter_marks()
        );
        chapters.push(chapter);
    }
    Ok(chapters)
}
