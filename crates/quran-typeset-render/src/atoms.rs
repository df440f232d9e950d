//! Box/glue/penalty atoms and cumulative metrics over atom sequences.
//!
//! The same model is used twice: horizontally, where boxes are shaped words
//! and widths are advances, and vertically, where boxes are composed lines and
//! widths are line heights. The box payload type is the only difference.

use serde::{Deserialize, Serialize};

/// Penalty cost that forbids a break.
pub const INFINITY: f64 = f64::INFINITY;

/// Elastic space specification.
///
/// The specification never changes once built; the width a glue ends up with
/// on a composed line is computed by [`Glue::resolve`] and stored separately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Glue {
    /// Natural width.
    pub natural: f64,
    /// Stretch capacity.
    pub stretch: f64,
    /// Shrink capacity.
    pub shrink: f64,
}

impl Glue {
    pub const fn new(natural: f64, stretch: f64, shrink: f64) -> Self {
        Self {
            natural,
            stretch,
            shrink,
        }
    }

    /// Rigid glue with no stretch or shrink.
    pub const fn fixed(natural: f64) -> Self {
        Self::new(natural, 0.0, 0.0)
    }

    /// Width after applying an adjustment ratio.
    ///
    /// Positive ratios scale the stretch, negative ratios the shrink. The
    /// result never drops below zero.
    pub fn resolve(&self, ratio: f64) -> f64 {
        let delta = if ratio > 0.0 {
            ratio * self.stretch
        } else if ratio < 0.0 {
            ratio * self.shrink
        } else {
            0.0
        };
        // 0 * inf: a rigid glue under an unbounded ratio, or fill glue at ratio 0.
        let delta = if delta.is_nan() { 0.0 } else { delta };
        (self.natural + delta).max(0.0)
    }
}

/// Candidate break point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Penalty {
    /// Width added to the line when it breaks here.
    pub width: f64,
    /// Break cost. `+inf` forbids the break, `-inf` forces it.
    pub cost: f64,
    /// Flagged penalties discourage consecutive flagged breaks.
    pub flagged: bool,
}

impl Penalty {
    pub const fn new(width: f64, cost: f64, flagged: bool) -> Self {
        Self {
            width,
            cost,
            flagged,
        }
    }

    /// Zero-width penalty that forbids breaking.
    pub const fn forbidden() -> Self {
        Self::new(0.0, INFINITY, false)
    }

    /// Zero-width forced break.
    pub const fn forced() -> Self {
        Self::new(0.0, f64::NEG_INFINITY, false)
    }

    pub fn is_forced(&self) -> bool {
        self.cost == f64::NEG_INFINITY
    }

    pub fn is_forbidden(&self) -> bool {
        self.cost == INFINITY
    }
}

/// Tagged unit of content.
#[derive(Clone, Debug, PartialEq)]
pub enum Atom<T> {
    /// Rigid content with a fixed width.
    Box { width: f64, content: T },
    /// Elastic space.
    Glue(Glue),
    /// Candidate break point.
    Penalty(Penalty),
}

impl<T> Atom<T> {
    pub fn boxed(width: f64, content: T) -> Self {
        Self::Box {
            width: width.max(0.0),
            content,
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Self::Box { .. })
    }

    pub fn is_glue(&self) -> bool {
        matches!(self, Self::Glue(_))
    }

    pub fn is_penalty(&self) -> bool {
        matches!(self, Self::Penalty(_))
    }

    /// True for a penalty with cost `-inf`.
    pub fn is_forced_break(&self) -> bool {
        matches!(self, Self::Penalty(p) if p.is_forced())
    }

    /// Width contributed to an unbroken run. Penalties contribute nothing
    /// unless the run breaks at them.
    pub fn natural_width(&self) -> f64 {
        match self {
            Self::Box { width, .. } => *width,
            Self::Glue(glue) => glue.natural,
            Self::Penalty(_) => 0.0,
        }
    }

    pub fn stretch(&self) -> f64 {
        match self {
            Self::Glue(glue) => glue.stretch,
            Self::Box { .. } | Self::Penalty(_) => 0.0,
        }
    }

    pub fn shrink(&self) -> f64 {
        match self {
            Self::Glue(glue) => glue.shrink,
            Self::Box { .. } | Self::Penalty(_) => 0.0,
        }
    }

    pub fn content(&self) -> Option<&T> {
        match self {
            Self::Box { content, .. } => Some(content),
            Self::Glue(_) | Self::Penalty(_) => None,
        }
    }
}

/// Natural width and elasticity of a run of atoms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RangeMetrics {
    pub natural: f64,
    pub shrink: f64,
    pub stretch: f64,
}

/// Prefix sums indexed by atom position; entry `i` covers atoms `[0, i)`.
#[derive(Clone, Debug)]
struct CumulativeSums {
    width: Vec<f64>,
    shrink: Vec<f64>,
    stretch: Vec<f64>,
}

impl CumulativeSums {
    fn with_capacity(capacity: usize) -> Self {
        let mut sums = Self {
            width: Vec::with_capacity(capacity + 1),
            shrink: Vec::with_capacity(capacity + 1),
            stretch: Vec::with_capacity(capacity + 1),
        };
        sums.width.push(0.0);
        sums.shrink.push(0.0);
        sums.stretch.push(0.0);
        sums
    }

    fn push<T>(&mut self, atom: &Atom<T>) {
        let idx = self.width.len() - 1;
        self.width.push(self.width[idx] + atom.natural_width());
        self.shrink.push(self.shrink[idx] + atom.shrink());
        self.stretch.push(self.stretch[idx] + atom.stretch());
    }

    fn len(&self) -> usize {
        self.width.len() - 1
    }
}

/// Ordered, appendable atom list with O(1) range metrics.
///
/// Prefix sums are maintained on every append, so range queries are always
/// valid for the current atom count.
#[derive(Clone, Debug)]
pub struct AtomSequence<T> {
    atoms: Vec<Atom<T>>,
    sums: CumulativeSums,
}

impl<T> Default for AtomSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AtomSequence<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            atoms: Vec::with_capacity(capacity),
            sums: CumulativeSums::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, atom: Atom<T>) {
        self.sums.push(&atom);
        self.atoms.push(atom);
    }

    pub fn push_box(&mut self, width: f64, content: T) {
        self.push(Atom::boxed(width, content));
    }

    pub fn push_glue(&mut self, glue: Glue) {
        self.push(Atom::Glue(glue));
    }

    pub fn push_penalty(&mut self, penalty: Penalty) {
        self.push(Atom::Penalty(penalty));
    }

    /// Append a bare forced break.
    pub fn push_forced_break(&mut self) {
        self.push_penalty(Penalty::forced());
    }

    /// Append the paragraph-closing group: a forbidden break, fill glue with
    /// unbounded stretch, and a flagged forced break.
    ///
    /// The fill glue lets the last line of a paragraph sit at its natural
    /// width instead of being stretched to the full measure.
    pub fn close_paragraph(&mut self) {
        self.push_penalty(Penalty::forbidden());
        self.push_glue(Glue::new(0.0, INFINITY, 0.0));
        self.push_penalty(Penalty::new(0.0, f64::NEG_INFINITY, true));
    }

    /// True when the sequence ends with a forced break.
    pub fn is_closed(&self) -> bool {
        self.atoms.last().is_some_and(Atom::is_forced_break)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Index of the final atom.
    pub fn last_index(&self) -> Option<usize> {
        self.atoms.len().checked_sub(1)
    }

    pub fn atoms(&self) -> &[Atom<T>] {
        &self.atoms
    }

    pub fn get(&self, idx: usize) -> Option<&Atom<T>> {
        self.atoms.get(idx)
    }

    /// Consume the sequence, yielding its atoms.
    pub fn into_atoms(self) -> Vec<Atom<T>> {
        self.atoms
    }

    /// Natural width, shrink and stretch of atoms `[start, end)`.
    ///
    /// Bounds are clamped to the sequence; an empty or inverted range yields
    /// zero metrics.
    pub fn range_metrics(&self, start: usize, end: usize) -> RangeMetrics {
        debug_assert_eq!(self.sums.len(), self.atoms.len());
        let end = end.min(self.atoms.len());
        if start >= end {
            return RangeMetrics::default();
        }
        RangeMetrics {
            natural: self.sums.width[end] - self.sums.width[start],
            shrink: self.sums.shrink[end] - self.sums.shrink[start],
            stretch: self.sums.stretch[end] - self.sums.stretch[start],
        }
    }

    /// Whether a break is allowed at `idx`: a glue directly after a box, or a
    /// penalty that is not forbidden.
    pub fn is_legal_break(&self, idx: usize) -> bool {
        match self.atoms.get(idx) {
            Some(Atom::Glue(_)) => idx > 0 && self.atoms[idx - 1].is_box(),
            Some(Atom::Penalty(p)) => !p.is_forbidden(),
            Some(Atom::Box { .. }) | None => false,
        }
    }
}

impl<T> FromIterator<Atom<T>> for AtomSequence<T> {
    fn from_iter<I: IntoIterator<Item = Atom<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut seq = Self::with_capacity(iter.size_hint().0);
        for atom in iter {
            seq.push(atom);
        }
        seq
    }
}
