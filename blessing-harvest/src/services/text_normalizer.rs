//! Text normalization and candidate cleaning
//!
//! `normalize` produces the comparison key used by deduplication.
//! `clean_candidate` tidies raw extracted text before it is judged or stored.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Punctuation and quotes trimmed from both ends of a comparison key
const TRIM_CHARS: &[char] = &[
    '。', '！', '!', '？', '?', '，', ',', '、', '；', ';', '：', ':', '“', '”', '‘', '’', '"',
    '\'',
];

/// Upper bound on normalization passes; real text settles after one or two
const MAX_NORMALIZE_PASSES: usize = 8;

static LIST_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d一二三四五六七八九十]+[、.．）)]\s*").expect("valid regex"));
static PAREN_NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[（(]\d+[)）]\s*").expect("valid regex"));
static LEADING_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[—\-–]+\s*").expect("valid regex"));
static TRAILING_DASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[—\-–]+$").expect("valid regex"));
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

fn normalize_pass(text: &str) -> String {
    let compact: String = text.nfkc().filter(|c| !c.is_whitespace()).collect();
    compact.trim_matches(TRIM_CHARS).to_string()
}

/// Canonical comparison form of a text
///
/// NFKC, all whitespace removed, edge punctuation trimmed. Passes repeat
/// until the output is stable: removing whitespace can bring a base letter
/// next to a combining mark that NFKC then composes, and some compatibility
/// characters decompose into a space.
pub fn normalize(text: &str) -> String {
    let mut current = normalize_pass(text);
    for _ in 1..MAX_NORMALIZE_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Number of CJK unified ideographs (U+4E00..=U+9FFF)
pub fn count_cjk(text: &str) -> usize {
    text.chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c))
        .count()
}

/// Strip list numbering and stray dashes, collapse whitespace runs
pub fn clean_candidate(text: &str) -> String {
    let text = LIST_PREFIX.replace(text, "");
    let text = PAREN_NUMBER_PREFIX.replace(&text, "");

    let text = text.trim();
    let text = LEADING_DASHES.replace(text, "");
    let text = TRAILING_DASHES.replace(&text, "");

    let text = SPACE_RUNS.replace_all(&text, " ");
    let text = NEWLINE_RUNS.replace_all(&text, "\n\n");

    text.trim().to_string()
}
