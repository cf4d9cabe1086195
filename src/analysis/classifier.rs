//! Heading level classification: gating, the heuristic table and the
//! optional learned overlay.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::model::{HeadingCandidate, HeadingLevel, TextLine};

use super::features::line_features;
use super::language::Language;
use super::model::ClassifierHandle;
use super::rules::{top_font_keys, HeadingRules, WordRange};

/// How many of the largest distinct font sizes may carry headings.
pub const HEADING_FONT_SIZES: usize = 2;

/// Scope in which an accepted heading text suppresses later repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// A text is accepted once per document
    #[default]
    Document,
    /// A text is accepted once per page
    Page,
    /// Repeats are kept
    Off,
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DedupPolicy::Document => "document",
            DedupPolicy::Page => "page",
            DedupPolicy::Off => "off",
        })
    }
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document" => Ok(DedupPolicy::Document),
            "page" => Ok(DedupPolicy::Page),
            "off" | "none" => Ok(DedupPolicy::Off),
            other => Err(format!("unknown dedup policy: {}", other)),
        }
    }
}

/// Whether a learned model refines the heuristic levels. Chosen once.
#[derive(Debug, Clone, Default)]
pub enum LevelStrategy {
    #[default]
    HeuristicOnly,
    WithOverlay(ClassifierHandle),
}

impl LevelStrategy {
    /// Overlay when a handle is available, heuristics otherwise.
    pub fn from_handle(handle: Option<ClassifierHandle>) -> Self {
        match handle {
            Some(handle) => LevelStrategy::WithOverlay(handle),
            None => LevelStrategy::HeuristicOnly,
        }
    }

    pub fn has_overlay(&self) -> bool {
        matches!(self, LevelStrategy::WithOverlay(_))
    }
}

/// What the learned overlay said about one line.
#[derive(Debug)]
pub enum OverlayOutcome {
    /// No model configured
    Unavailable,
    /// The model could not score the line
    Failed(ModelError),
    /// The model predicted `O`
    Background,
    /// The model's probability was below the configured minimum
    LowConfidence(f64),
    /// The model's level replaces the heuristic one
    Heading { level: HeadingLevel, confidence: f64 },
}

impl OverlayOutcome {
    /// Final (level, confidence) given the heuristic level.
    pub fn resolve(self, heuristic: HeadingLevel) -> (HeadingLevel, f64) {
        match self {
            OverlayOutcome::Heading { level, confidence } => (level, confidence),
            OverlayOutcome::Failed(e) => {
                log::warn!("Classifier overlay failed, keeping {}: {}", heuristic, e);
                (heuristic, 1.0)
            }
            OverlayOutcome::Unavailable
            | OverlayOutcome::Background
            | OverlayOutcome::LowConfidence(_) => (heuristic, 1.0),
        }
    }
}

/// Turns text lines into leveled heading candidates.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    rules: HeadingRules,
    strategy: LevelStrategy,
    dedup: DedupPolicy,
    cased_words: WordRange,
    caseless_words: WordRange,
    min_overlay_confidence: f64,
}

impl HeadingClassifier {
    pub fn new(strategy: LevelStrategy) -> Self {
        Self {
            rules: HeadingRules::new(),
            strategy,
            dedup: DedupPolicy::default(),
            cased_words: WordRange::CASED,
            caseless_words: WordRange::CASELESS,
            min_overlay_confidence: 0.0,
        }
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_word_ranges(mut self, cased: WordRange, caseless: WordRange) -> Self {
        self.cased_words = cased;
        self.caseless_words = caseless;
        self
    }

    pub fn with_min_overlay_confidence(mut self, confidence: f64) -> Self {
        self.min_overlay_confidence = confidence;
        self
    }

    pub fn strategy(&self) -> &LevelStrategy {
        &self.strategy
    }

    /// Ask the overlay about one line.
    pub fn overlay(&self, line: &TextLine, language: &Language) -> OverlayOutcome {
        let model = match &self.strategy {
            LevelStrategy::HeuristicOnly => return OverlayOutcome::Unavailable,
            LevelStrategy::WithOverlay(model) => model,
        };

        match model.predict(&line_features(line, language)) {
            Err(e) => OverlayOutcome::Failed(e),
            Ok(p) if !p.level.is_heading() => OverlayOutcome::Background,
            Ok(p) if p.probability < self.min_overlay_confidence => {
                OverlayOutcome::LowConfidence(p.probability)
            }
            Ok(p) => OverlayOutcome::Heading {
                level: p.level,
                confidence: p.probability,
            },
        }
    }

    /// Classify every line. `redundant` holds one flag per line; missing
    /// flags count as not redundant.
    ///
    /// With an overlay, the model sees every non-empty line: a heading
    /// prediction overrides both the heuristic level and a gate rejection.
    /// Deduplication applies to the final decision either way.
    ///
    /// Candidates come back in (page, top) order.
    pub fn classify(
        &self,
        lines: &[TextLine],
        language: &Language,
        redundant: &[bool],
    ) -> Vec<HeadingCandidate> {
        let font_keys = top_font_keys(lines, HEADING_FONT_SIZES);
        let words = if language.is_caseless() {
            self.caseless_words
        } else {
            self.cased_words
        };

        let mut seen: HashSet<(u32, &str)> = HashSet::new();
        let mut candidates = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let text = line.trimmed();
            if text.is_empty() {
                continue;
            }
            let key = match self.dedup {
                DedupPolicy::Document => Some((0, text)),
                DedupPolicy::Page => Some((line.page, text)),
                DedupPolicy::Off => None,
            };
            if key.is_some_and(|k| seen.contains(&k)) {
                continue;
            }

            let gated = !words.contains(line.word_count())
                || self.rules.is_list_or_leader(text)
                || !font_keys.contains(&line.font_key())
                || redundant.get(index).copied().unwrap_or(false);

            let outcome = self.overlay(line, language);
            let (level, confidence) = match outcome {
                OverlayOutcome::Heading { level, confidence } if gated => {
                    log::debug!("Overlay kept gated line {:?} as {}", text, level);
                    (level, confidence)
                }
                _ if gated => continue,
                outcome => outcome.resolve(self.rules.level_for(text)),
            };
            if !level.is_heading() {
                continue;
            }

            if let Some(k) = key {
                seen.insert(k);
            }
            candidates.push(
                HeadingCandidate::new(level, text, line.page, line.top).with_confidence(confidence),
            );
        }

        candidates.sort_by(|a, b| a.page.cmp(&b.page).then(a.top.total_cmp(&b.top)));
        log::debug!(
            "{} of {} lines classified as headings",
            candidates.len(),
            lines.len()
        );
        candidates
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new(LevelStrategy::HeuristicOnly)
    }
}
