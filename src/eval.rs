//! Outline evaluation against gold annotations.
//!
//! Each level in [`EVAL_LEVELS`] is scored as a set of (normalized text, page)
//! pairs. The title counts as a single entry on page 1.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::analysis::features::{line_features, FeatureVector};
use crate::analysis::language::Language;
use crate::error::{Error, Result};
use crate::model::{Document, HeadingLevel, TextLine};

/// Levels that are scored.
pub const EVAL_LEVELS: [HeadingLevel; 4] = [
    HeadingLevel::Title,
    HeadingLevel::H1,
    HeadingLevel::H2,
    HeadingLevel::H3,
];

/// Trim and lowercase.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

type EntrySet = HashSet<(String, u32)>;

/// Per-level entry sets of a document, nested children included.
pub fn heading_sets(doc: &Document) -> HashMap<HeadingLevel, EntrySet> {
    let mut sets: HashMap<HeadingLevel, EntrySet> = HashMap::new();

    let title = normalize(&doc.title);
    if !title.is_empty() {
        sets.entry(HeadingLevel::Title).or_default().insert((title, 1));
    }
    for node in doc.flatten() {
        if EVAL_LEVELS.contains(&node.level) && node.level != HeadingLevel::Title {
            sets.entry(node.level)
                .or_default()
                .insert((normalize(&node.text), node.page));
        }
    }
    sets
}

/// Precision, recall and F1 of one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl LevelMetrics {
    /// Score a predicted set against a gold set.
    ///
    /// Two empty sets agree perfectly.
    pub fn from_sets(pred: &EntrySet, gold: &EntrySet) -> Self {
        if pred.is_empty() && gold.is_empty() {
            return Self {
                precision: 1.0,
                recall: 1.0,
                f1: 1.0,
                tp: 0,
                fp: 0,
                fn_: 0,
            };
        }

        let tp = pred.intersection(gold).count();
        let fp = pred.len() - tp;
        let fn_ = gold.len() - tp;
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
            tp,
            fp,
            fn_,
        }
    }
}

/// Metrics for every scored level plus their macro average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub title: LevelMetrics,
    #[serde(rename = "H1")]
    pub h1: LevelMetrics,
    #[serde(rename = "H2")]
    pub h2: LevelMetrics,
    #[serde(rename = "H3")]
    pub h3: LevelMetrics,
    pub macro_f1: f64,
}

impl EvaluationReport {
    /// Metrics of one level, `None` for unscored levels.
    pub fn level(&self, level: HeadingLevel) -> Option<&LevelMetrics> {
        match level {
            HeadingLevel::Title => Some(&self.title),
            HeadingLevel::H1 => Some(&self.h1),
            HeadingLevel::H2 => Some(&self.h2),
            HeadingLevel::H3 => Some(&self.h3),
            _ => None,
        }
    }

    /// (level, metrics) in [`EVAL_LEVELS`] order.
    pub fn levels(&self) -> [(HeadingLevel, &LevelMetrics); 4] {
        [
            (HeadingLevel::Title, &self.title),
            (HeadingLevel::H1, &self.h1),
            (HeadingLevel::H2, &self.h2),
            (HeadingLevel::H3, &self.h3),
        ]
    }
}

/// Score a predicted outline against a gold outline.
pub fn evaluate(pred: &Document, gold: &Document) -> EvaluationReport {
    let pred_sets = heading_sets(pred);
    let gold_sets = heading_sets(gold);
    let empty = EntrySet::new();

    let score = |level: HeadingLevel| {
        LevelMetrics::from_sets(
            pred_sets.get(&level).unwrap_or(&empty),
            gold_sets.get(&level).unwrap_or(&empty),
        )
    };

    let title = score(HeadingLevel::Title);
    let h1 = score(HeadingLevel::H1);
    let h2 = score(HeadingLevel::H2);
    let h3 = score(HeadingLevel::H3);
    let macro_f1 = (title.f1 + h1.f1 + h2.f1 + h3.f1) / EVAL_LEVELS.len() as f64;

    EvaluationReport {
        title,
        h1,
        h2,
        h3,
        macro_f1,
    }
}

/// Read an outline JSON file (prediction or gold).
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| Error::Eval(format!("{}: {}", path.display(), e)))
}

/// Load and score a prediction file against a gold file.
pub fn evaluate_files<P: AsRef<Path>, G: AsRef<Path>>(pred: P, gold: G) -> Result<EvaluationReport> {
    let pred = load_document(pred)?;
    let gold = load_document(gold)?;
    Ok(evaluate(&pred, &gold))
}

/// Gold level of each line, matched by exact (normalized text, page).
///
/// Unmatched lines are `O`. The gold title is matched on page 1; an outline
/// entry with the same text and page takes precedence over the title.
pub fn gold_labels(lines: &[TextLine], gold: &Document) -> Vec<HeadingLevel> {
    let mut index: HashMap<(String, u32), HeadingLevel> = HashMap::new();

    let title = normalize(&gold.title);
    if !title.is_empty() {
        index.insert((title, 1), HeadingLevel::Title);
    }
    for node in gold.flatten() {
        index.insert((normalize(&node.text), node.page), node.level);
    }

    lines
        .iter()
        .map(|line| {
            index
                .get(&(normalize(&line.text), line.page))
                .copied()
                .unwrap_or(HeadingLevel::NotHeading)
        })
        .collect()
}

/// (features, gold level) pairs for an external trainer.
pub fn training_pairs(
    lines: &[TextLine],
    gold: &Document,
    language: &Language,
) -> Vec<(FeatureVector, HeadingLevel)> {
    lines
        .iter()
        .zip(gold_labels(lines, gold))
        .map(|(line, label)| (line_features(line, language), label))
        .collect()
}
