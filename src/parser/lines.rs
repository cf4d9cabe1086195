//! Grouping of positioned words into visual lines.

use std::collections::BTreeMap;

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{PageWords, TextLine, Word};

use super::backend::TextLayer;
use super::options::{ErrorMode, ExtractOptions};

/// Builds [`TextLine`]s with their typographic and positional features.
///
/// Words sharing the same `top` (rounded to one decimal) form a line.
/// Lines are emitted top to bottom, words left to right.
#[derive(Debug, Clone, Default)]
pub struct LineFeatureExtractor {
    options: ExtractOptions,
}

impl LineFeatureExtractor {
    /// Create an extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with the given options.
    pub fn with_options(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Extract the lines of every page, page after page.
    ///
    /// In [`ErrorMode::Lenient`] an unreadable page is logged and skipped.
    pub fn extract(&self, layer: &dyn TextLayer) -> Result<Vec<TextLine>> {
        let mut lines = Vec::new();

        for page in 1..=layer.page_count() {
            match layer.page_words(page) {
                Ok(words) => lines.extend(self.extract_page(&words)),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(lines)
    }

    /// Lines of a single page.
    pub fn extract_page(&self, page: &PageWords) -> Vec<TextLine> {
        let mut buckets: BTreeMap<i64, Vec<&Word>> = BTreeMap::new();
        for word in &page.words {
            let key = (word.top * 10.0).round() as i64;
            buckets.entry(key).or_default().push(word);
        }

        let mut lines = Vec::with_capacity(buckets.len());
        let mut previous_bottom: Option<f32> = None;

        for (_, mut words) in buckets {
            words.sort_by(|a, b| a.x0.total_cmp(&b.x0));

            let text = words
                .iter()
                .map(|w| self.normalize(&w.text))
                .filter(|t| !t.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.trim().is_empty() {
                continue;
            }

            let first = words[0];
            let top = words.iter().map(|w| w.top).fold(f32::INFINITY, f32::min);
            let bottom = words
                .iter()
                .map(|w| w.bottom)
                .fold(f32::NEG_INFINITY, f32::max);
            let whitespace_above = previous_bottom
                .map(|prev| (top - prev).max(0.0))
                .unwrap_or(0.0);
            previous_bottom = Some(bottom);

            let font = first.font_name.to_lowercase();
            lines.push(TextLine {
                text,
                font_size: first.font_size,
                is_bold: font.contains("bold"),
                is_italic: font.contains("italic") || font.contains("oblique"),
                top,
                bottom,
                whitespace_above,
                page: page.page,
                page_height: page.height,
            });
        }

        lines
    }

    fn normalize(&self, text: &str) -> String {
        if self.options.normalize_unicode {
            text.nfkc().collect()
        } else {
            text.to_string()
        }
    }
}
