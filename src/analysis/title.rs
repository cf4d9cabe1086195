//! Document title detection.

use std::collections::HashSet;
use std::path::Path;

use crate::model::{font_key, TextLine};

/// Lines at the start of the document considered for the title.
pub const TITLE_WINDOW: usize = 10;

/// Appended to every title.
pub const TITLE_PADDING: &str = "  ";

/// Maximum number of lines joined into a title.
const MAX_TITLE_LINES: usize = 2;

/// Minimum words for a title line.
const MIN_TITLE_WORDS: usize = 2;

/// Picks the title from the largest-font lines at the top of the document.
#[derive(Debug, Clone)]
pub struct TitleDetector {
    window: usize,
}

impl TitleDetector {
    pub fn new() -> Self {
        Self {
            window: TITLE_WINDOW,
        }
    }

    /// Consider the first `window` lines instead of [`TITLE_WINDOW`].
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Detect the title of a document.
    ///
    /// With no lines at all the title is derived from `source_name` (a file
    /// name or path).
    pub fn detect(&self, lines: &[TextLine], source_name: &str) -> String {
        if lines.is_empty() {
            return format!("{}{}", title_from_file_name(source_name), TITLE_PADDING);
        }

        let mut top: Vec<&TextLine> = lines.iter().take(self.window).collect();
        // Stable: equal sizes keep document order.
        top.sort_by(|a, b| b.font_size.total_cmp(&a.font_size));

        let mut used_sizes = HashSet::new();
        let mut parts: Vec<&str> = Vec::with_capacity(MAX_TITLE_LINES);
        for line in top {
            if parts.len() >= MAX_TITLE_LINES {
                break;
            }
            let size = font_key(line.font_size);
            if line.word_count() >= MIN_TITLE_WORDS && !used_sizes.contains(&size) {
                parts.push(line.trimmed());
                used_sizes.insert(size);
            }
        }

        format!("{}{}", parts.join(" ").trim(), TITLE_PADDING)
    }
}

impl Default for TitleDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// `my_report.pdf` becomes `My Report`.
pub fn title_from_file_name(source_name: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    title_case(&stem.replace('_', " "))
}

/// Upper-cases the first letter of each alphabetic run and lower-cases the
/// rest, so `v2-final` becomes `V2-Final`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lines_use_file_name() {
        let title = TitleDetector::new().detect(&[], "my_report.pdf");
        assert_eq!(title, "My Report  ");
        assert_eq!(title_from_file_name("/data/in/ANNUAL_plan_2024.pdf"), "Annual Plan 2024");
    }

    #[test]
    fn test_file_name_words_split_on_non_letters() {
        assert_eq!(title_from_file_name("report-v2_final.pdf"), "Report-V2 Final");
        assert_eq!(title_from_file_name("o'neil.draft.pdf"), "O'Neil.Draft");
        assert_eq!(title_from_file_name("plan2b.pdf"), "Plan2B");
    }

    #[test]
    fn test_two_largest_distinct_sizes() {
        let lines = vec![
            TextLine::new("Header Note", 9.0, 1),
            TextLine::new("Understanding Water Quality", 24.0, 1),
            TextLine::new("Repeated Big Font", 24.0, 1),
            TextLine::new("A Field Guide", 16.0, 1),
            TextLine::new("Body text line here", 10.0, 1),
        ];
        let title = TitleDetector::new().detect(&lines, "x.pdf");
        assert_eq!(title, "Understanding Water Quality A Field Guide  ");
    }

    #[test]
    fn test_single_word_lines_skipped() {
        let lines = vec![
            TextLine::new("RFP", 30.0, 1),
            TextLine::new("Request for Proposal", 20.0, 1),
        ];
        assert_eq!(
            TitleDetector::new().detect(&lines, "x.pdf"),
            "Request for Proposal  "
        );
    }

    #[test]
    fn test_only_window_is_considered() {
        let mut lines: Vec<TextLine> = (0..10)
            .map(|i| TextLine::new(format!("body line {}", i), 10.0, 1))
            .collect();
        lines.push(TextLine::new("Late Big Heading", 40.0, 2));
        let title = TitleDetector::new().detect(&lines, "x.pdf");
        assert_eq!(title, "body line 0  ");
    }

    #[test]
    fn test_no_qualifying_lines_gives_padding_only() {
        let lines = vec![TextLine::new("Lonely", 12.0, 1)];
        assert_eq!(TitleDetector::new().detect(&lines, "x.pdf"), "  ");
    }
}
