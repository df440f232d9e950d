//! Composed lines: the output of paragraph breaking and the boxes of page
//! breaking.

use crate::atoms::Glue;
use crate::shaping::ShapedWord;

/// Entry of a composed text line, in logical (right-to-left) order.
#[derive(Clone, Debug, PartialEq)]
pub enum LineItem {
    Word(ShapedWord),
    /// Inter-word space with its specification and resolved width.
    Space { glue: Glue, width: f64 },
}

impl LineItem {
    pub fn width(&self) -> f64 {
        match self {
            Self::Word(word) => word.width(),
            Self::Space { width, .. } => *width,
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Self::Word(_))
    }
}

/// What a line holds.
#[derive(Clone, Debug, PartialEq)]
pub enum LineContent {
    Text(Vec<LineItem>),
    /// Chapter heading: title and verse-count sub-lines.
    Heading(Vec<Line>),
}

/// A composed line with its vertical extent.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub content: LineContent,
    pub height: f64,
}

impl Line {
    /// Text line; trailing spaces are dropped.
    pub fn text(mut items: Vec<LineItem>, height: f64) -> Self {
        while items.last().is_some_and(|item| !item.is_word()) {
            items.pop();
        }
        Self {
            content: LineContent::Text(items),
            height,
        }
    }

    pub fn heading(lines: Vec<Line>, height: f64) -> Self {
        Self {
            content: LineContent::Heading(lines),
            height,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.content, LineContent::Heading(_))
    }

    pub fn items(&self) -> &[LineItem] {
        match &self.content {
            LineContent::Text(items) => items,
            LineContent::Heading(_) => &[],
        }
    }

    /// Words of the line, including those of heading sub-lines.
    pub fn words(&self) -> Box<dyn Iterator<Item = &ShapedWord> + '_> {
        match &self.content {
            LineContent::Text(items) => Box::new(items.iter().filter_map(|item| match item {
                LineItem::Word(word) => Some(word),
                LineItem::Space { .. } => None,
            })),
            LineContent::Heading(lines) => Box::new(lines.iter().flat_map(Line::words)),
        }
    }

    /// Set width of a text line. Headings report zero.
    pub fn width(&self) -> f64 {
        self.items().iter().map(LineItem::width).sum()
    }

    pub fn has_quarter(&self) -> bool {
        self.words().any(|word| word.quarter)
    }

    /// Quarter markers set on this line; a short line can carry several.
    pub fn quarter_marks(&self) -> usize {
        self.words().filter(|word| word.quarter).count()
    }

    pub fn has_prostration(&self) -> bool {
        self.words().any(|word| word.prostration)
    }

    pub fn has_marker(&self) -> bool {
        self.has_quarter() || self.has_prostration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaping::{HeuristicShaper, ShapeCache};
    use std::sync::Arc;

    #[test]
    fn text_lines_drop_trailing_space_and_sum_widths() {
        let mut cache = ShapeCache::new(Arc::new(HeuristicShaper::new(10.0)));
        let word = cache.shape_word("رب").expect("shape");
        let glue = Glue::new(3.2, 1.6, 2.1);
        let line = Line::text(
            vec![
                LineItem::Word(word.clone()),
                LineItem::Space { glue, width: 4.0 },
                LineItem::Word(word.clone()),
                LineItem::Space { glue, width: 0.0 },
            ],
            29.0,
        );
        assert_eq!(line.items().len(), 3);
        assert_eq!(line.width(), word.width() * 2.0 + 4.0);
        assert!(!line.has_marker());
    }

    #[test]
    fn heading_reports_markers_of_sub_lines() {
        let marker = ShapedWord::quarter_marker();
        let sub = Line::text(vec![LineItem::Word(marker)], 29.0);
        let heading = Line::heading(vec![sub], 52.2);
        assert!(heading.is_heading());
        assert!(heading.has_quarter());
        assert_eq!(heading.width(), 0.0);
    }
}
