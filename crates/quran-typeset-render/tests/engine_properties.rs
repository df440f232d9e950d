use std::sync::Arc;

use quran_typeset_render::{
    breakpoints, compute_adjustment_ratio, Atom, AtomSequence, BreakMode, Glue, HeuristicShaper,
    PageComposer, ParagraphComposer, Penalty, ShapeCache, TypesetConfig,
};

/// Small deterministic generator so property loops need no extra crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (self.next() % 1000) as f64 / 1000.0 * (hi - lo)
    }
}

fn random_paragraph(rng: &mut Lcg, words: usize) -> AtomSequence<()> {
    let mut seq = AtomSequence::new();
    for idx in 0..words {
        if idx > 0 {
            let space = rng.range(3.0, 6.0);
            seq.push_glue(Glue::new(space, space / 2.0, space / 1.5));
        }
        seq.push_box(rng.range(10.0, 40.0), ());
    }
    seq.close_paragraph();
    seq
}

#[test]
fn prefix_sums_match_independent_totals() {
    let mut rng = Lcg(7);
    for words in [1usize, 2, 9, 40] {
        let seq = random_paragraph(&mut rng, words);
        let metrics = seq.range_metrics(0, seq.len());
        let natural: f64 = seq.atoms().iter().map(Atom::natural_width).sum();
        let shrink: f64 = seq.atoms().iter().map(Atom::shrink).sum();
        assert!((metrics.natural - natural).abs() < 1e-9);
        assert!((metrics.shrink - shrink).abs() < 1e-9);
        assert!(metrics.stretch.is_infinite(), "closing fill glue");
    }
}

#[test]
fn break_indices_increase_and_end_at_the_closing_break() {
    let mut rng = Lcg(11);
    for round in 0..20 {
        let seq = random_paragraph(&mut rng, 5 + round * 3);
        let last = seq.last_index().expect("non-empty");
        for mode in [BreakMode::Tolerance(4.0), BreakMode::Accumulate] {
            let breaks = breakpoints(&seq, &[120.0, 150.0], mode).expect("breaks");
            let indices = breaks.indices();
            assert!(indices.windows(2).all(|w| w[0] < w[1]), "{:?}", indices);
            assert_eq!(indices.last(), Some(&last));
        }
    }
}

#[test]
fn justified_lines_reconstruct_their_target_width() {
    let mut rng = Lcg(23);
    let targets = [150.0];
    let tolerance = 4.0;
    for _ in 0..20 {
        let seq = random_paragraph(&mut rng, 30);
        let breaks = breakpoints(&seq, &targets, BreakMode::Tolerance(tolerance)).expect("breaks");
        for segment in breaks.segments() {
            let ratio = compute_adjustment_ratio(
                &seq,
                segment.start,
                segment.end,
                segment.line,
                &targets,
            );
            if !ratio.is_finite() || ratio.abs() > tolerance || ratio == 0.0 {
                continue;
            }
            let mut width = 0.0;
            for atom in &seq.atoms()[segment.start..segment.end] {
                width += match atom {
                    Atom::Box { width, .. } => *width,
                    Atom::Glue(glue) => glue.resolve(ratio),
                    Atom::Penalty(_) => 0.0,
                };
            }
            if let Some(Atom::Penalty(p)) = seq.get(segment.end) {
                width += p.width;
            }
            assert!((width - targets[0]).abs() < 1e-6, "ratio {} width {}", ratio, width);
        }
    }
}

#[test]
fn three_words_at_exactly_their_natural_width_make_one_line() {
    let mut cache = ShapeCache::new(Arc::new(HeuristicShaper::new(11.5)));
    let natural = ["الحمد", "لله", "رب"]
        .iter()
        .map(|w| cache.shape_word(w).expect("shape").width())
        .sum::<f64>()
        + 2.0 * cache.space_width().expect("space");
    let config = TypesetConfig {
        text_widths: vec![natural],
        ..TypesetConfig::default()
    };

    let mut composer = ParagraphComposer::new(&mut cache, &config);
    let seq = composer.atoms("الحمد لله رب").expect("atoms");
    let breaks = breakpoints(&seq, &config.text_widths, BreakMode::Tolerance(config.tolerance))
        .expect("breaks");
    assert_eq!(breaks.indices(), &[seq.last_index().expect("closed")]);
    let ratio = compute_adjustment_ratio(&seq, 0, breaks.indices()[0], 0, &config.text_widths);
    assert!(ratio.abs() < 1e-9);

    let lines = composer.break_lines("الحمد لله رب").expect("lines");
    assert_eq!(lines.len(), 1);
    assert!((lines[0].width() - natural).abs() < 1e-9);
}

#[test]
fn box_penalty_glue_box_breaks_after_the_first_box() {
    let seq: AtomSequence<()> = [
        Atom::boxed(50.0, ()),
        Atom::Penalty(Penalty::new(0.0, 0.0, false)),
        Atom::Glue(Glue::new(10.0, 5.0, 5.0)),
        Atom::boxed(50.0, ()),
        Atom::Penalty(Penalty::forced()),
    ]
    .into_iter()
    .collect();

    let breaks = breakpoints(&seq, &[100.0], BreakMode::Tolerance(4.0)).expect("breaks");
    assert_eq!(breaks.indices(), &[1, 4]);
    // The second line is 60 wide and must stretch its 5 units by 8.
    assert_eq!(compute_adjustment_ratio(&seq, 2, 4, 1, &[100.0]), 8.0);
    assert_eq!(compute_adjustment_ratio(&seq, 0, 4, 0, &[100.0]), -2.0);
}

#[test]
fn five_lines_two_per_page() {
    let mut seq = AtomSequence::new();
    for n in 0..5 {
        seq.push_box(10.0, n);
        seq.push_glue(Glue::fixed(0.0));
    }
    let breaks = breakpoints(
        &{
            let mut closed = seq.clone();
            closed.push_forced_break();
            closed
        },
        &[20.0],
        BreakMode::Accumulate,
    )
    .expect("breaks");
    assert_eq!(breaks.len(), 3);

    let lines: AtomSequence<quran_typeset_render::Line> = seq
        .into_atoms()
        .into_iter()
        .map(|atom| match atom {
            Atom::Box { width, .. } => {
                Atom::boxed(width, quran_typeset_render::Line::text(Vec::new(), width))
            }
            Atom::Glue(glue) => Atom::Glue(glue),
            Atom::Penalty(p) => Atom::Penalty(p),
        })
        .collect();
    let pages = PageComposer::new(2, 10.0).compose(lines).expect("pages");
    let counts: Vec<usize> = pages.iter().map(|p| p.line_count()).collect();
    assert_eq!(counts, vec![2, 2, 1]);
}

#[test]
fn shaping_is_idempotent() {
    let mut cache = ShapeCache::new(Arc::new(HeuristicShaper::new(11.5)));
    let first = cache.shape_word("العالمين").expect("shape");
    let second = cache.shape_word("العالمين").expect("shape");
    assert_eq!(first.width().to_bits(), second.width().to_bits());
    assert_eq!(first.run.glyphs, second.run.glyphs);
    assert!(Arc::ptr_eq(&first.run, &second.run));
    assert_eq!(cache.hits(), 1);
}
