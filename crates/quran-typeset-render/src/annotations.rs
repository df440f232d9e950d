//! Quarter, group (hizb) and part (juz) labels for the page margin.
//!
//! The text is divided into 240 quarters; four quarters make a group and two
//! groups make a part. Quarter markers in the text are counted in drawing
//! order and the running count decides which label a marked line gets.

use quran_typeset::format_number;
use serde::{Deserialize, Serialize};

const QUARTER_WORDS: [&str; 3] = ["ربع", "نصف", "ثلاثة أرباع"];
const GROUP_WORD: &str = "حزب";
const OF_GROUP_WORD: &str = "الحزب";
const PART_WORD: &str = "جزء";
const PROSTRATION_WORD: &str = "سجدة";

/// Label derived from one counter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuarterLabel {
    /// `quarters` fourths into the current group (1..=3).
    Quarter { quarters: u8 },
    /// Start of a group.
    Group { group: usize },
    /// Start of a group that also starts a part.
    GroupAndPart { group: usize, part: usize },
}

impl QuarterLabel {
    pub fn for_counter(counter: usize) -> Self {
        match counter % 4 {
            0 if counter % 8 == 0 => Self::GroupAndPart {
                group: counter / 4,
                part: counter / 8 + 1,
            },
            0 => Self::Group {
                group: counter / 4,
            },
            quarters => Self::Quarter {
                quarters: quarters as u8,
            },
        }
    }

    /// Margin text, one entry per note line.
    pub fn lines(&self) -> Vec<String> {
        match *self {
            Self::Quarter { quarters } => {
                let word = QUARTER_WORDS[usize::from(quarters.clamp(1, 3)) - 1];
                vec![word.to_string(), OF_GROUP_WORD.to_string()]
            }
            Self::Group { group } => vec![GROUP_WORD.to_string(), format_number(group)],
            Self::GroupAndPart { group, part } => vec![
                format!("{} {}", GROUP_WORD, format_number(group)),
                format!("{} {}", PART_WORD, format_number(part)),
            ],
        }
    }
}

/// Running quarter counter for one document.
///
/// Starts at 1 and advances once per quarter-marked line, in page order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuarterTracker {
    counter: usize,
}

impl Default for QuarterTracker {
    fn default() -> Self {
        Self { counter: 1 }
    }
}

impl QuarterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value the next marker will be labelled with.
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Label the current marker, then advance.
    pub fn advance(&mut self) -> QuarterLabel {
        let label = QuarterLabel::for_counter(self.counter);
        self.counter += 1;
        label
    }
}

/// Text drawn in the outer margin beside a marked line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginNote {
    pub quarter: Option<QuarterLabel>,
    pub prostration: bool,
}

impl MarginNote {
    pub fn is_empty(&self) -> bool {
        self.quarter.is_none() && !self.prostration
    }

    /// Note lines, top to bottom.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(3);
        if self.prostration {
            lines.push(PROSTRATION_WORD.to_string());
        }
        if let Some(label) = &self.quarter {
            lines.extend(label.lines());
        }
        lines
    }
}
