//! Per-line feature vector fed to the learned classifier.

use crate::model::TextLine;

use super::language::Language;

/// Number of features per line.
pub const FEATURE_COUNT: usize = 8;

/// Feature names, in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "font_size",
    "is_bold",
    "is_italic",
    "text_length",
    "capital_ratio",
    "whitespace_above",
    "relative_top",
    "numbering",
];

/// Prefixes that mark a numbered line.
const NUMBERING_PREFIXES: [&str; 5] = ["1.", "1.1", "1.1.1", "I.", "A."];

/// A line's features in [`FEATURE_NAMES`] order.
pub type FeatureVector = [f64; FEATURE_COUNT];

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Share of uppercase characters; 0 for caseless languages and empty text.
pub fn capital_ratio(text: &str, language: &Language) -> f64 {
    if language.is_caseless() {
        return 0.0;
    }
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 / total as f64
}

/// Whether the trimmed text starts with a numbering prefix.
pub fn has_numbering(text: &str) -> bool {
    let text = text.trim();
    NUMBERING_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Build the feature vector of a line.
pub fn line_features(line: &TextLine, language: &Language) -> FeatureVector {
    let relative_top = if line.page_height > 0.0 {
        (line.top / line.page_height) as f64
    } else {
        0.0
    };

    [
        line.font_size as f64,
        flag(line.is_bold),
        flag(line.is_italic),
        line.text.chars().count() as f64,
        capital_ratio(&line.text, language),
        line.whitespace_above as f64,
        relative_top,
        flag(has_numbering(&line.text)),
    ]
}
