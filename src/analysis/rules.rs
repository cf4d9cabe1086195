//! Heuristic heading rules: gating predicates and the level table.

use std::collections::BTreeSet;

use regex::Regex;

use crate::model::{font_key, HeadingLevel, TextLine};

/// Leading characters that mark list items and table rows.
const LIST_MARKERS: [char; 4] = ['-', '•', '—', '|'];

/// Inclusive word-count window for heading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRange {
    pub min: usize,
    pub max: usize,
}

impl WordRange {
    /// Window for languages with letter case.
    pub const CASED: WordRange = WordRange { min: 2, max: 12 };

    /// Window for caseless languages, where one "word" can be a whole phrase.
    pub const CASELESS: WordRange = WordRange { min: 1, max: 20 };

    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Compiled patterns for heading decisions.
#[derive(Debug, Clone)]
pub struct HeadingRules {
    four_level: Regex,
    three_level: Regex,
    one_level: Regex,
    dot_leader: Regex,
}

impl HeadingRules {
    pub fn new() -> Self {
        Self {
            four_level: Regex::new(r"^\d+\.\d+\.\d+\.\d+\s").expect("valid regex"),
            three_level: Regex::new(r"^\d+\.\d+\.\d+\s").expect("valid regex"),
            one_level: Regex::new(r"^\d+\.\s").expect("valid regex"),
            dot_leader: Regex::new(r"\.{5,}").expect("valid regex"),
        }
    }

    /// Level of a gated line; first matching rule wins.
    ///
    /// Two-level numbering (`1.2 Scope`) has no rule of its own and falls
    /// through to the colon and default rules.
    pub fn level_for(&self, text: &str) -> HeadingLevel {
        let text = text.trim();
        if self.four_level.is_match(text) {
            HeadingLevel::H4
        } else if self.three_level.is_match(text) {
            HeadingLevel::H3
        } else if self.one_level.is_match(text) {
            HeadingLevel::H1
        } else if text.ends_with(':') {
            HeadingLevel::H3
        } else {
            HeadingLevel::H2
        }
    }

    /// List bullets, table rows and table-of-contents leaders.
    pub fn is_list_or_leader(&self, text: &str) -> bool {
        let text = text.trim();
        text.starts_with(&LIST_MARKERS[..]) || self.dot_leader.is_match(text)
    }
}

impl Default for HeadingRules {
    fn default() -> Self {
        Self::new()
    }
}

/// The `n` largest distinct font sizes, as [`font_key`]s.
pub fn top_font_keys(lines: &[TextLine], n: usize) -> BTreeSet<i32> {
    let keys: BTreeSet<i32> = lines.iter().map(|l| font_key(l.font_size)).collect();
    keys.into_iter().rev().take(n).collect()
}
