use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quran_typeset::{select_chapters, Chapter, ChapterMeta};
use quran_typeset_render::{
    decode_document, typeset_corpus, write_document, DrawCommand, HeuristicShaper, OutputFormat,
    PageAnnotationKind, PageRecorder, QuarterLabel, TypesetConfig, TypesetError, Typesetter,
};

static NONCE: AtomicUsize = AtomicUsize::new(0);

fn temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "quran-typeset-render-{}-{}-{}",
        name,
        std::process::id(),
        NONCE.fetch_add(1, Ordering::Relaxed)
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

const VERSE: &str = "الحمد لله رب العالمين الرحمن الرحيم مالك يوم الدين";

fn chapter(number: usize, verses: Vec<String>) -> Chapter {
    let meta = ChapterMeta {
        name: "البقرة".to_string(),
        place: "مدنية".to_string(),
        opening: true,
        verses: None,
    };
    Chapter::from_verses(number, meta, &verses)
}

/// A long chapter with a quarter marker every few verses.
fn marked_chapter(number: usize, verses: usize, every: usize) -> Chapter {
    let verses = (0..verses)
        .map(|n| {
            if n > 0 && n % every == 0 {
                format!("\u{06DE}\u{00A0}{}", VERSE)
            } else {
                VERSE.to_string()
            }
        })
        .collect();
    chapter(number, verses)
}

#[test]
fn quarter_counter_rises_by_one_per_marker_across_pages() {
    let chapters = vec![marked_chapter(2, 60, 5), marked_chapter(3, 40, 4)];
    let expected: usize = chapters.iter().map(Chapter::quarter_marks).sum();

    let mut typesetter = Typesetter::with_heuristic_shaper(TypesetConfig::default());
    let mut recorder = PageRecorder::new(396.0, 540.0);
    let summary = typesetter.typeset(&chapters, &mut recorder).expect("typeset");
    assert!(summary.pages > 2, "marks must span several pages");
    assert_eq!(summary.quarter_marks, expected);
    assert_eq!(typesetter.quarter_counter(), expected + 1);

    let labels: Vec<String> = recorder
        .pages()
        .iter()
        .flat_map(|page| page.annotations.iter())
        .filter(|a| a.kind == PageAnnotationKind::Quarter)
        .filter_map(|a| a.value.clone())
        .collect();
    assert_eq!(labels.len(), expected);
    for (idx, label) in labels.iter().enumerate() {
        assert_eq!(*label, QuarterLabel::for_counter(idx + 1).lines().join(" "));
    }
}

#[test]
fn pages_are_numbered_in_order_and_fit_the_page_height() {
    let config = TypesetConfig::default();
    let mut typesetter = Typesetter::with_heuristic_shaper(config.clone());
    let lines = typesetter
        .compose_lines(&[marked_chapter(2, 50, 7)])
        .expect("lines");
    let pages = typesetter.compose_pages(lines).expect("pages");
    for (idx, page) in pages.iter().enumerate() {
        assert_eq!(page.number, idx + 1);
        assert!(page.line_count() <= config.lines_per_page);
        assert!(page.height() <= config.page_height_target() + 1e-6);
    }
}

#[test]
fn typesets_a_corpus_directory_into_both_formats() {
    let dir = temp_dir("corpus");
    fs::write(dir.join("meta.txt"), "الفاتحة\tمكية\t0\nالبقرة\tمدنية\n").expect("meta");
    fs::write(dir.join("001.txt"), format!("{}\n{}\n", VERSE, VERSE)).expect("001");
    fs::write(
        dir.join("002.txt"),
        format!("الم\n\u{06DE}\u{00A0}{}\nكلمة \u{06E9}سجدة\n", VERSE),
    )
    .expect("002");

    let selection = select_chapters(&[1, 2]).expect("selection");
    let document = typeset_corpus(
        &dir,
        &selection,
        TypesetConfig::default(),
        Arc::new(HeuristicShaper::new(11.5)),
    )
    .expect("document");
    assert_eq!(document.page_width, 396.0);
    assert!(!document.pages.is_empty());
    let first = &document.pages[0];
    assert!(first
        .chrome_commands
        .iter()
        .any(|cmd| matches!(cmd, DrawCommand::Rule(rule) if rule.line_width == 3.0)));
    assert!(document
        .pages
        .iter()
        .flat_map(|p| p.annotations.iter())
        .any(|a| a.kind == PageAnnotationKind::Prostration));

    for format in [OutputFormat::Json, OutputFormat::Postcard] {
        let path = dir.join(format!("out.{}", format.as_str()));
        write_document(&document, &path, format).expect("write");
        let bytes = fs::read(&path).expect("read back");
        assert_eq!(OutputFormat::from_path(&path), format);
        let decoded = decode_document(&bytes, format).expect("decode");
        assert_eq!(decoded.pages.len(), document.pages.len());
        for (read, written) in decoded.pages.iter().zip(&document.pages) {
            assert_eq!(read.page_number, written.page_number);
            assert_eq!(read.merged_commands_len(), written.merged_commands_len());
            assert_eq!(read.annotations, written.annotations);
        }
    }
    let postcard = fs::read(dir.join("out.postcard")).expect("postcard");
    assert_eq!(
        decode_document(&postcard, OutputFormat::Postcard).expect("decode"),
        document
    );
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_chapter_fails_before_layout() {
    let dir = temp_dir("missing");
    fs::write(dir.join("meta.txt"), "الفاتحة\tمكية\t0\n").expect("meta");
    let selection = select_chapters(&[1]).expect("selection");
    let err = typeset_corpus(
        &dir,
        &selection,
        TypesetConfig::default(),
        Arc::new(HeuristicShaper::new(11.5)),
    )
    .expect_err("chapter file is missing");
    assert!(matches!(err, TypesetError::Corpus(_)), "{}", err);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn narrow_measure_reports_a_fit_error() {
    let config = TypesetConfig {
        text_widths: vec![5.0],
        ..TypesetConfig::default()
    };
    let mut typesetter = Typesetter::with_heuristic_shaper(config);
    let err = typesetter
        .typeset_document(&[chapter(1, vec![VERSE.to_string()])])
        .expect_err("words wider than the measure");
    assert!(matches!(err, TypesetError::Break(_)), "{}", err);
}
