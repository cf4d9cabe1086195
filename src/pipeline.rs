//! The outline pipeline for one document.

use std::path::Path;

use crate::analysis::classifier::{DedupPolicy, HeadingClassifier, LevelStrategy};
use crate::analysis::hierarchy::assemble;
use crate::analysis::language::{detect_language, Language};
use crate::analysis::model::ClassifierHandle;
use crate::analysis::redundancy::{
    EmbeddingProvider, HashingEmbedder, RedundancyFilter, DEFAULT_REDUNDANCY_THRESHOLD,
};
use crate::analysis::rules::WordRange;
use crate::analysis::title::{TitleDetector, TITLE_WINDOW};
use crate::error::Result;
use crate::model::{Document, TextLine};
use crate::parser::{ErrorMode, ExtractOptions, LineFeatureExtractor, LopdfTextLayer, TextLayer};

/// Options for building an outline.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Scope of heading deduplication
    pub dedup: DedupPolicy,

    /// Whether to drop lines too similar to the whole document
    pub semantic_filter: bool,

    /// Cosine similarity above which a line is redundant
    pub redundancy_threshold: f32,

    /// Heading word-count window for cased scripts
    pub cased_words: WordRange,

    /// Heading word-count window for caseless scripts
    pub caseless_words: WordRange,

    /// Number of leading lines considered for the title
    pub title_window: usize,

    /// Minimum model probability for an overlay decision to stick
    pub min_overlay_confidence: f64,

    /// Line extraction settings
    pub extract: ExtractOptions,
}

impl OutlineOptions {
    /// Create new outline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deduplication policy.
    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    /// Enable or disable semantic redundancy filtering.
    pub fn with_semantic_filter(mut self, enabled: bool) -> Self {
        self.semantic_filter = enabled;
        self
    }

    /// Set the redundancy threshold.
    pub fn with_redundancy_threshold(mut self, threshold: f32) -> Self {
        self.redundancy_threshold = threshold;
        self
    }

    /// Set the word-count windows.
    pub fn with_word_ranges(mut self, cased: WordRange, caseless: WordRange) -> Self {
        self.cased_words = cased;
        self.caseless_words = caseless;
        self
    }

    /// Set the title window.
    pub fn with_title_window(mut self, lines: usize) -> Self {
        self.title_window = lines;
        self
    }

    /// Set the minimum overlay confidence.
    pub fn with_min_overlay_confidence(mut self, confidence: f64) -> Self {
        self.min_overlay_confidence = confidence;
        self
    }

    /// Skip unreadable pages instead of failing the document.
    pub fn lenient_pages(mut self) -> Self {
        self.extract.error_mode = ErrorMode::Lenient;
        self
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            dedup: DedupPolicy::Document,
            semantic_filter: true,
            redundancy_threshold: DEFAULT_REDUNDANCY_THRESHOLD,
            cased_words: WordRange::CASED,
            caseless_words: WordRange::CASELESS,
            title_window: TITLE_WINDOW,
            min_overlay_confidence: 0.0,
            extract: ExtractOptions::default(),
        }
    }
}

/// Builds a [`Document`] outline from lines, a text layer or a PDF file.
#[derive(Debug)]
pub struct Outliner {
    options: OutlineOptions,
    extractor: LineFeatureExtractor,
    classifier: HeadingClassifier,
    titles: TitleDetector,
    filter: Option<RedundancyFilter>,
}

impl Outliner {
    /// Heuristic-only outliner; uses the [`HashingEmbedder`] when the
    /// semantic filter is enabled.
    pub fn new(options: OutlineOptions) -> Self {
        let classifier = Self::build_classifier(&options, LevelStrategy::HeuristicOnly);
        let filter = options.semantic_filter.then(|| {
            RedundancyFilter::new(Box::new(HashingEmbedder::default()))
                .with_threshold(options.redundancy_threshold)
        });

        Self {
            extractor: LineFeatureExtractor::with_options(options.extract.clone()),
            titles: TitleDetector::new().with_window(options.title_window),
            classifier,
            filter,
            options,
        }
    }

    fn build_classifier(options: &OutlineOptions, strategy: LevelStrategy) -> HeadingClassifier {
        HeadingClassifier::new(strategy)
            .with_dedup(options.dedup)
            .with_word_ranges(options.cased_words, options.caseless_words)
            .with_min_overlay_confidence(options.min_overlay_confidence)
    }

    /// Use a learned classifier overlay when a handle is given.
    pub fn with_classifier(mut self, handle: Option<ClassifierHandle>) -> Self {
        self.classifier = Self::build_classifier(&self.options, LevelStrategy::from_handle(handle));
        self
    }

    /// Replace the embedding provider of the semantic filter.
    ///
    /// Has no effect when the semantic filter is disabled in the options.
    pub fn with_embedder(mut self, provider: Box<dyn EmbeddingProvider>) -> Self {
        if self.options.semantic_filter {
            self.filter = Some(
                RedundancyFilter::new(provider).with_threshold(self.options.redundancy_threshold),
            );
        }
        self
    }

    /// Current options.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Whether a learned overlay is active.
    pub fn has_classifier(&self) -> bool {
        self.classifier.strategy().has_overlay()
    }

    /// Extract the text lines of a layer.
    pub fn lines(&self, layer: &dyn TextLayer) -> Result<Vec<TextLine>> {
        self.extractor.extract(layer)
    }

    /// Language of a line sequence, English when undecidable.
    pub fn language(&self, lines: &[TextLine]) -> Language {
        detect_language(lines).unwrap_or_else(|e| {
            log::debug!("Language detection failed ({}), assuming English", e);
            Language::ENGLISH
        })
    }

    /// Build the outline of already-extracted lines.
    ///
    /// `source_name` is only used for the fallback title.
    pub fn outline_lines(&self, lines: &[TextLine], source_name: &str) -> Document {
        let language = self.language(lines);

        let redundant = match &self.filter {
            Some(filter) => filter.flag(lines).unwrap_or_else(|e| {
                log::warn!("Semantic filter disabled for {}: {}", source_name, e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let candidates = self.classifier.classify(lines, &language, &redundant);
        let title = self.titles.detect(lines, source_name);
        let outline = assemble(candidates);

        log::debug!(
            "{}: language={}, {} lines, {} top-level outline nodes",
            source_name,
            language,
            lines.len(),
            outline.len()
        );

        Document { title, outline }
    }

    /// Build the outline of a text layer.
    pub fn outline_layer(&self, layer: &dyn TextLayer, source_name: &str) -> Result<Document> {
        let lines = self.lines(layer)?;
        Ok(self.outline_lines(&lines, source_name))
    }

    /// Build the outline of a PDF file.
    pub fn outline_file<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let layer = LopdfTextLayer::open(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.outline_layer(&layer, &name)
    }

    /// Build the outline of an in-memory PDF.
    pub fn outline_bytes(&self, data: &[u8], source_name: &str) -> Result<Document> {
        let layer = LopdfTextLayer::from_bytes(data)?;
        self.outline_layer(&layer, source_name)
    }
}

impl Default for Outliner {
    fn default() -> Self {
        Self::new(OutlineOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;

    #[test]
    fn test_outline_options_builder() {
        let options = OutlineOptions::new()
            .with_dedup(DedupPolicy::Page)
            .with_semantic_filter(false)
            .with_title_window(5)
            .lenient_pages();

        assert_eq!(options.dedup, DedupPolicy::Page);
        assert!(!options.semantic_filter);
        assert_eq!(options.title_window, 5);
        assert_eq!(options.extract.error_mode, ErrorMode::Lenient);
    }

    #[test]
    fn test_default_options() {
        let options = OutlineOptions::default();
        assert_eq!(options.dedup, DedupPolicy::Document);
        assert!(options.semantic_filter);
        assert_eq!(options.redundancy_threshold, 0.9);
        assert_eq!(options.cased_words, WordRange::CASED);
    }

    #[test]
    fn test_outline_lines_end_to_end() {
        let lines = vec![
            TextLine::new("Annual Water Report", 24.0, 1).at(50.0),
            TextLine::new("1. Introduction and Purpose", 16.0, 1).at(120.0),
            TextLine::new("This report describes the sampling results.", 10.0, 1).at(150.0),
            TextLine::new("Sampling Network Design", 16.0, 2).at(60.0),
            TextLine::new("Stations were chosen along the river.", 10.0, 2).at(90.0),
        ];

        let doc = Outliner::default().outline_lines(&lines, "report.pdf");
        assert_eq!(doc.title, "Annual Water Report 1. Introduction and Purpose  ");
        assert_eq!(doc.outline.len(), 2);
        assert_eq!(doc.outline[0].level, HeadingLevel::H2);
        assert_eq!(doc.outline[0].text, "Annual Water Report");
        assert_eq!(doc.outline[1].level, HeadingLevel::H1);
        assert_eq!(doc.outline[1].children[0].text, "Sampling Network Design");
        assert_eq!(doc.outline[1].children[0].page, 2);
    }

    #[test]
    fn test_no_lines_gives_file_name_title() {
        let doc = Outliner::default().outline_lines(&[], "my_report.pdf");
        assert_eq!(doc.title, "My Report  ");
        assert!(doc.outline.is_empty());
    }
}
