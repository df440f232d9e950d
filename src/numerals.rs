//! Arabic-Indic digits and spelled-out Arabic numbers.

/// Offset from an ASCII digit to its Arabic-Indic counterpart.
const ARABIC_INDIC_OFFSET: u32 = 0x0630;

/// Format a number with Arabic-Indic digits (٠١٢٣٤٥٦٧٨٩).
pub fn format_number(number: usize) -> String {
    number
        .to_string()
        .chars()
        .map(|c| char::from_u32(c as u32 + ARABIC_INDIC_OFFSET).unwrap_or(c))
        .collect()
}

// Masculine and feminine forms; entries that differ by case carry
// (nominative, accusative/genitive) pairs.
const ONES: [(&str, &str); 10] = [
    ("", ""),
    ("واحد", "واحدة"),
    ("", ""),
    ("ثلاث", "ثلاثة"),
    ("أربع", "أربعة"),
    ("خمس", "خمسة"),
    ("ست", "ستة"),
    ("سبع", "سبعة"),
    ("ثماني", "ثمانية"),
    ("تسع", "تسعة"),
];

const TWO: [[&str; 2]; 2] = [["إثنان", "إثنين"], ["إثنتان", "إثنتين"]];
const TWELVE: [[&str; 2]; 2] = [["إثنا عشر", "إثني عشر"], ["إثنتا عشرة", "إثنتي عشرة"]];

const TEENS: [(&str, &str); 10] = [
    ("عشر", "عشرة"),
    ("أحد عشر", "إحدى عشرة"),
    ("", ""),
    ("ثلاث عشرة", "ثلاثة عشر"),
    ("أربع عشرة", "أربعة عشر"),
    ("خمس عشرة", "خمسة عشر"),
    ("ست عشرة", "ستة عشر"),
    ("سبع عشرة", "سبعة عشر"),
    ("ثماني عشرة", "ثمانية عشر"),
    ("تسع عشرة", "تسعة عشر"),
];

const TENS: [[&str; 2]; 10] = [
    ["", ""],
    ["", ""],
    ["عشرون", "عشرين"],
    ["ثلاثون", "ثلاثين"],
    ["أربعون", "أربعين"],
    ["خمسون", "خمسين"],
    ["ستون", "ستين"],
    ["سبعون", "سبعين"],
    ["ثمانون", "ثمانين"],
    ["تسعون", "تسعين"],
];

const HUNDREDS: [&str; 10] = [
    "",
    "مائة",
    "",
    "ثلاثمائة",
    "أربعمائة",
    "خمسمائة",
    "ستمائة",
    "سبعمائة",
    "ثمانمائة",
    "تسعمائة",
];
const TWO_HUNDRED: [&str; 2] = ["مائتان", "مائتين"];

/// Grammatical case used by [`number_words`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberCase {
    /// Nominative (marfu').
    #[default]
    Nominative,
    /// Accusative/genitive (mansub/majrur).
    Oblique,
}

impl NumberCase {
    fn index(self) -> usize {
        match self {
            Self::Nominative => 0,
            Self::Oblique => 1,
        }
    }
}

/// Spell out `number` (1..=999) in Arabic words.
///
/// Returns `None` outside the supported range.
pub fn number_words(number: usize, case: NumberCase, feminine: bool) -> Option<String> {
    if number == 0 || number >= 1000 {
        return None;
    }
    let case = case.index();
    let gender = usize::from(feminine);
    let pick = |pair: (&'static str, &'static str)| if feminine { pair.1 } else { pair.0 };

    let mut items: Vec<&str> = Vec::with_capacity(3);
    let hundreds = number / 100;
    let rest = number % 100;
    match hundreds {
        0 => {}
        2 => items.push(TWO_HUNDRED[case]),
        h => items.push(HUNDREDS[h]),
    }

    match rest {
        0 => {}
        2 => items.push(TWO[gender][case]),
        12 => items.push(TWELVE[gender][case]),
        1..=9 => items.push(pick(ONES[rest])),
        10..=19 => items.push(pick(TEENS[rest - 10])),
        _ => {
            let ones = rest % 10;
            items.push(TENS[rest / 10][case]);
            match ones {
                0 => {}
                2 => items.push(TWO[gender][case]),
                o => items.push(pick(ONES[o])),
            }
        }
    }

    Some(items.join(" و "))
}
