//! Lines to pages.
//!
//! Lines are boxes whose width is their height; the glue between them is the
//! only vertical elasticity. One accumulate-or-backtrack pass over the whole
//! document picks page breaks, then each page's glue is resolved with that
//! page's adjustment ratio.

use crate::atoms::{Atom, AtomSequence, Glue};
use crate::breaker::{breakpoints, compute_adjustment_ratio, BreakError, BreakMode};
use crate::lines::Line;

/// Entry of a page, top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub enum PageItem {
    Line(Line),
    /// Vertical space with its specification and resolved height.
    Space { glue: Glue, height: f64 },
}

impl PageItem {
    pub fn height(&self) -> f64 {
        match self {
            Self::Line(line) => line.height,
            Self::Space { height, .. } => *height,
        }
    }
}

/// A composed page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// 1-based; odd pages sit on the right-hand side of a spread.
    pub number: usize,
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Line(line) => Some(line),
            PageItem::Space { .. } => None,
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total height of the page's entries.
    pub fn height(&self) -> f64 {
        self.items.iter().map(PageItem::height).sum()
    }

    fn strip(&mut self) {
        while self
            .items
            .last()
            .is_some_and(|item| !matches!(item, PageItem::Line(_)))
        {
            self.items.pop();
        }
    }
}

/// Packs lines into pages of a fixed number of lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageComposer {
    lines_per_page: usize,
    leading: f64,
}

impl PageComposer {
    pub fn new(lines_per_page: usize, leading: f64) -> Self {
        Self {
            lines_per_page: lines_per_page.max(1),
            leading,
        }
    }

    /// Page capacity: lines per page times the leading.
    pub fn target(&self) -> f64 {
        self.lines_per_page as f64 * self.leading
    }

    /// Raw entries a single page may hold, spacing included.
    pub fn entry_limit(&self) -> usize {
        self.lines_per_page * 2
    }

    /// Break the document's vertical atoms into numbered pages.
    ///
    /// A closing forced break is appended when the stream lacks one.
    pub fn compose(&self, mut seq: AtomSequence<Line>) -> Result<Vec<Page>, BreakError> {
        log::info!("Breaking lines into pages…");
        if !seq.is_closed() {
            seq.push_forced_break();
        }

        let targets = [self.target()];
        let breaks = breakpoints(&seq, &targets, BreakMode::Accumulate)?;
        let limit = self.entry_limit();

        let mut plans = Vec::with_capacity(breaks.len());
        for segment in breaks.segments() {
            let entries = segment.end.saturating_sub(segment.start);
            if entries > limit {
                return Err(BreakError::PageOverflow {
                    page: segment.line + 1,
                    entries,
                    limit,
                });
            }
            let ratio = compute_adjustment_ratio(
                &seq,
                segment.start,
                segment.end,
                segment.line,
                &targets,
            );
            plans.push((segment, ratio));
        }

        let mut atoms = seq.into_atoms().into_iter().enumerate();
        let mut pages = Vec::with_capacity(plans.len());
        for (segment, ratio) in plans {
            let mut page = Page {
                number: segment.line + 1,
                items: Vec::with_capacity(segment.end.saturating_sub(segment.start)),
            };
            for (idx, atom) in atoms.by_ref() {
                if idx >= segment.end {
                    break;
                }
                match atom {
                    Atom::Box { content, .. } => page.items.push(PageItem::Line(content)),
                    Atom::Glue(glue) => page.items.push(PageItem::Space {
                        glue,
                        height: glue.resolve(ratio),
                    }),
                    Atom::Penalty(_) => {}
                }
            }
            page.strip();
            pages.push(page);
        }
        Ok(pages)
    }
}
