mod common;

use common::TempCorpus;
use quran_typeset::{
    chapter_path, read_corpus, read_metadata, select_chapters, ChapterSelection, CorpusErrorCode,
};

#[test]
fn loads_selected_chapters_in_request_order() {
    let corpus = TempCorpus::new("order");
    corpus.write_meta(&["الفاتحة\tمكية\t0", "البقرة\tمدنية", "آل عمران\tمدنية\t1\t200"]);
    corpus.write_chapter(1, &["بسم الله الرحمن الرحيم", "الحمد لله رب العالمين"]);
    corpus.write_chapter(2, &["الم", "", "ذلك الكتاب لا ريب فيه"]);
    corpus.write_chapter(3, &["الم"]);

    let selection = select_chapters(&[3, 1]).expect("selection");
    let chapters = read_corpus(corpus.path(), &selection).expect("corpus");
    let numbers: Vec<usize> = chapters.iter().map(|c| c.number).collect();
    assert_eq!(numbers, vec![3, 1]);

    assert_eq!(chapters[0].verses, 200, "metadata override");
    assert!(chapters[0].has_opening());
    assert_eq!(chapters[1].verses, 2);
    assert!(!chapters[1].has_opening());
    assert_eq!(
        chapters[1].text,
        "بسم الله الرحمن الرحيم الحمد لله رب العالمين"
    );

    let chapters = read_corpus(corpus.path(), &select_chapters(&[2]).expect("selection"))
        .expect("corpus");
    assert_eq!(chapters[0].verses, 2, "blank lines are not verses");
}

#[test]
fn missing_metadata_is_reported_first() {
    let corpus = TempCorpus::new("nometa");
    corpus.write_chapter(1, &["الحمد لله"]);
    let err = read_corpus(corpus.path(), &select_chapters(&[1]).expect("selection"))
        .expect_err("meta.txt is missing");
    assert_eq!(err.code, CorpusErrorCode::MetaMissing);
    assert!(err.to_string().starts_with("META_MISSING"));
}

#[test]
fn missing_chapter_names_the_file() {
    let corpus = TempCorpus::new("nochapter");
    corpus.write_meta(&["الفاتحة\tمكية\t0", "البقرة\tمدنية"]);
    corpus.write_chapter(1, &["الحمد لله"]);
    let err = read_corpus(corpus.path(), &select_chapters(&[1, 2]).expect("selection"))
        .expect_err("002.txt is missing");
    assert_eq!(err.code, CorpusErrorCode::ChapterMissing);
    assert_eq!(err.chapter, Some(2));
    let expected = chapter_path(corpus.path(), 2).display().to_string();
    assert_eq!(err.path.as_deref(), Some(expected.as_str()));
}

#[test]
fn full_selection_needs_every_chapter() {
    let corpus = TempCorpus::new("full");
    corpus.write_meta(&["الفاتحة\tمكية\t0"]);
    corpus.write_chapter(1, &["الحمد لله"]);
    assert_eq!(read_metadata(corpus.path()).expect("meta").len(), 1);
    let err = read_corpus(corpus.path(), &ChapterSelection::all()).expect_err("only one chapter");
    assert_eq!(err.code, CorpusErrorCode::ChapterMissing);
    assert_eq!(err.chapter, Some(2));
}

#[test]
fn malformed_metadata_row_reports_its_line() {
    let corpus = TempCorpus::new("badmeta");
    corpus.write_meta(&["الفاتحة\tمكية\t0", "البقرة"]);
    let err = read_metadata(corpus.path()).expect_err("row 2 lacks a place");
    assert_eq!(err.code, CorpusErrorCode::MetaParse);
    assert_eq!(err.line, Some(2));
}
