//! Break selection over atom sequences.
//!
//! Two policies share the same adjustment-ratio arithmetic:
//!
//! - [`BreakMode::Tolerance`] fills lines first-fit, scoring each legal
//!   candidate by badness and committing the best one once the run would have
//!   to shrink past its capacity.
//! - [`BreakMode::Accumulate`] sums box and glue heights and backtracks to the
//!   last legal breakpoint when a page overflows.
//!
//! Both return strictly increasing indices ending at the sequence's closing
//! forced break.

use core::fmt;

use crate::atoms::{Atom, AtomSequence};

/// Ratios closer to zero than this count as an exact fit.
const FIT_EPSILON: f64 = 1e-6;
/// Shrinking past full shrink capacity makes a run overfull.
const MAX_SHRINK_RATIO: f64 = -1.0;
/// Added to the badness of candidates that stretch past the tolerance.
const LOOSE_DEMERITS: f64 = 1.0e12;

/// Break selection policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BreakMode {
    /// First-fit line filling; candidates stretching more than the tolerance
    /// are still usable but heavily penalised.
    Tolerance(f64),
    /// Greedy height accumulation with backtracking to the last legal break.
    Accumulate,
}

/// Content that cannot be broken against the requested target lengths.
#[derive(Clone, Debug, PartialEq)]
pub enum BreakError {
    /// A run needs to shrink beyond its capacity and no earlier candidate exists.
    Overfull { start: usize, index: usize, ratio: f64 },
    /// A page overflowed and no legal breakpoint exists since the page start.
    NoLegalBreakpoint { start: usize, index: usize },
    /// The sequence does not end with a forced break.
    MissingClosingBreak,
    /// No target lengths were supplied.
    EmptyTargets,
    /// A page segment holds more entries than the page can carry.
    PageOverflow { page: usize, entries: usize, limit: usize },
}

impl fmt::Display for BreakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overfull {
                start,
                index,
                ratio,
            } => write!(
                f,
                "content from atom {} cannot shrink to fit before atom {} (ratio {:.3})",
                start, index, ratio
            ),
            Self::NoLegalBreakpoint { start, index } => write!(
                f,
                "no legal breakpoint between atom {} and overflow at atom {}",
                start, index
            ),
            Self::MissingClosingBreak => f.write_str("sequence does not end with a forced break"),
            Self::EmptyTargets => f.write_str("no target lengths"),
            Self::PageOverflow {
                page,
                entries,
                limit,
            } => write!(
                f,
                "page {} holds {} entries, more than the limit of {}",
                page, entries, limit
            ),
        }
    }
}

impl std::error::Error for BreakError {}

/// Target length for a 0-based line; the last length repeats.
pub fn target_length(targets: &[f64], line: usize) -> Option<f64> {
    let last = targets.len().checked_sub(1)?;
    targets.get(line.min(last)).copied()
}

/// Signed ratio that makes atoms `[start, brk)` exactly fill their target.
///
/// Positive ratios stretch, negative ratios shrink. A penalty at `brk`
/// contributes its width. When the run must change but has no capacity in the
/// needed direction the ratio is infinite. The ratio is never clamped.
pub fn compute_adjustment_ratio<T>(
    seq: &AtomSequence<T>,
    start: usize,
    brk: usize,
    line: usize,
    targets: &[f64],
) -> f64 {
    let Some(target) = target_length(targets, line) else {
        return 0.0;
    };
    let metrics = seq.range_metrics(start, brk);
    let mut natural = metrics.natural;
    if let Some(Atom::Penalty(p)) = seq.get(brk) {
        natural += p.width;
    }

    if natural < target {
        if metrics.stretch > 0.0 {
            (target - natural) / metrics.stretch
        } else {
            f64::INFINITY
        }
    } else if natural > target {
        if metrics.shrink > 0.0 {
            (target - natural) / metrics.shrink
        } else {
            f64::NEG_INFINITY
        }
    } else {
        0.0
    }
}

/// Committed break indices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Breakpoints {
    indices: Vec<usize>,
}

/// One broken run: atoms `[start, end)` set on `line`, broken at `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Breakpoints {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Runs between consecutive breaks. The atom at each break is excluded;
    /// the next run starts right after it.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let mut start = 0usize;
        self.indices.iter().enumerate().map(move |(line, &end)| {
            let segment = Segment { line, start, end };
            start = end + 1;
            segment
        })
    }

    fn push(&mut self, idx: usize) {
        self.indices.push(idx);
    }
}

/// Choose break indices for `seq` against `targets`.
pub fn breakpoints<T>(
    seq: &AtomSequence<T>,
    targets: &[f64],
    mode: BreakMode,
) -> Result<Breakpoints, BreakError> {
    if targets.is_empty() {
        return Err(BreakError::EmptyTargets);
    }
    let last = match seq.last_index() {
        Some(last) if seq.is_closed() => last,
        _ => return Err(BreakError::MissingClosingBreak),
    };

    let breaks = match mode {
        BreakMode::Tolerance(tolerance) => tolerance_breaks(seq, targets, tolerance)?,
        BreakMode::Accumulate => accumulate_breaks(seq, targets)?,
    };

    debug_assert!(breaks.indices.windows(2).all(|w| w[0] < w[1]));
    if breaks.indices.last() != Some(&last) {
        return Err(BreakError::MissingClosingBreak);
    }
    Ok(breaks)
}

#[derive(Clone, Copy)]
struct Candidate {
    index: usize,
    demerits: f64,
}

fn demerits(ratio: f64, cost: f64, tolerance: f64) -> f64 {
    let badness = 100.0 * ratio.abs().powi(3);
    let badness = if badness.is_finite() {
        badness
    } else {
        LOOSE_DEMERITS
    };
    let loose = if ratio > tolerance { LOOSE_DEMERITS } else { 0.0 };
    badness + cost + loose
}

fn tolerance_breaks<T>(
    seq: &AtomSequence<T>,
    targets: &[f64],
    tolerance: f64,
) -> Result<Breakpoints, BreakError> {
    let atoms = seq.atoms();
    let mut breaks = Breakpoints::default();
    let mut start = 0usize;
    let mut best: Option<Candidate> = None;
    let mut idx = 0usize;

    while idx < atoms.len() {
        let forced = atoms[idx].is_forced_break();
        if !seq.is_legal_break(idx) || (idx == start && !forced) {
            idx += 1;
            continue;
        }

        let ratio = compute_adjustment_ratio(seq, start, idx, breaks.len(), targets);
        if ratio < MAX_SHRINK_RATIO {
            let Some(candidate) = best.take() else {
                return Err(BreakError::Overfull {
                    start,
                    index: idx,
                    ratio,
                });
            };
            breaks.push(candidate.index);
            start = candidate.index + 1;
            idx = start;
            continue;
        }

        let exact = ratio.abs() < FIT_EPSILON;
        if forced || exact {
            breaks.push(idx);
            start = idx + 1;
            best = None;
            idx = start;
            continue;
        }

        let cost = match &atoms[idx] {
            Atom::Penalty(p) => p.cost,
            _ => 0.0,
        };
        let score = demerits(ratio, cost, tolerance);
        if best.is_none_or(|b| score <= b.demerits) {
            best = Some(Candidate {
                index: idx,
                demerits: score,
            });
        }
        idx += 1;
    }

    Ok(breaks)
}

fn accumulate_breaks<T>(seq: &AtomSequence<T>, targets: &[f64]) -> Result<Breakpoints, BreakError> {
    let atoms = seq.atoms();
    let mut breaks = Breakpoints::default();
    let mut height = 0.0f64;
    let mut page_start = 0usize;
    let mut last_legal: Option<usize> = None;
    let mut idx = 0usize;

    while idx < atoms.len() {
        let target = target_length(targets, breaks.len()).unwrap_or(0.0);
        let atom = &atoms[idx];
        if !atom.is_penalty() {
            height += atom.natural_width();
        }
        if atom.is_box() {
            idx += 1;
            continue;
        }

        if height > target + FIT_EPSILON {
            let Some(brk) = last_legal.take() else {
                return Err(BreakError::NoLegalBreakpoint {
                    start: page_start,
                    index: idx,
                });
            };
            breaks.push(brk);
            height = 0.0;
            page_start = brk + 1;
            idx = page_start;
            continue;
        }

        if (height - target).abs() <= FIT_EPSILON || atom.is_forced_break() {
            breaks.push(idx);
            height = 0.0;
            page_start = idx + 1;
            last_legal = None;
        } else if seq.is_legal_break(idx) {
            last_legal = Some(idx);
        }
        idx += 1;
    }

    if let Some(last) = seq.last_index() {
        if breaks.indices.last() != Some(&last) {
            breaks.push(last);
        }
    }
    Ok(breaks)
}
