//! Characters that carry typesetting meaning in the chapter text.

/// Start-of-quarter sign (rub el hizb).
pub const QUARTER_MARK: char = '\u{06DE}';
/// Prostration sign.
pub const PROSTRATION_MARK: char = '\u{06E9}';
/// End-of-verse sign; a verse number follows it.
pub const VERSE_END: char = '\u{06DD}';
/// No-break space. Separates words visually but forbids a line break.
pub const NO_BREAK_SPACE: char = '\u{00A0}';
/// Ligature for the opening invocation set before most chapters.
pub const OPENING_INVOCATION: char = '\u{FDFD}';

/// Word separators recognised by the paragraph segmenter.
pub const WORD_SEPARATORS: [char; 3] = [' ', '\n', NO_BREAK_SPACE];

/// Returns true for characters the segmenter splits words on.
pub fn is_word_separator(ch: char) -> bool {
    WORD_SEPARATORS.contains(&ch)
}

/// Returns true when the text opens with a quarter marker and its no-break space.
pub fn starts_with_quarter(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next() == Some(QUARTER_MARK) && chars.next() == Some(NO_BREAK_SPACE)
}

/// Returns true for ASCII or Arabic-Indic decimal digits.
pub fn is_any_digit(ch: char) -> bool {
    ch.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&ch)
}

/// Returns true when `word` should be laid out left-to-right.
///
/// Everything is right-to-left except verse numbers (which open with the
/// verse-end sign or a parenthesis) and digit-only words.
pub fn is_left_to_right_word(word: &str) -> bool {
    match word.chars().next() {
        None => false,
        Some(VERSE_END) | Some('(') => true,
        Some(_) => word.chars().all(is_any_digit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_numbers_and_digits_run_left_to_right() {
        assert!(is_left_to_right_word("\u{06DD}\u{0661}\u{0662}"));
        assert!(is_left_to_right_word("(١)"));
        assert!(is_left_to_right_word("١٢٣"));
        assert!(is_left_to_right_word("42"));
        assert!(!is_left_to_right_word("الحمد"));
        assert!(!is_left_to_right_word(""));
    }

    #[test]
    fn quarter_prefix_requires_following_no_break_space() {
        assert!(starts_with_quarter("\u{06DE}\u{00A0}الحمد"));
        assert!(!starts_with_quarter("\u{06DE} الحمد"));
        assert!(!starts_with_quarter("الحمد"));
    }
}
