//! Learned heading classifier artifact.
//!
//! The artifact is a multiclass gradient-boosted tree ensemble serialized
//! with bincode. Training happens elsewhere; this module loads, validates and
//! evaluates it. A loaded artifact is immutable and shared through a
//! [`ClassifierHandle`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::HeadingLevel;

use super::features::{FeatureVector, FEATURE_COUNT};

/// Artifact format version this build reads and writes.
pub const ARTIFACT_VERSION: u32 = 1;

/// Shared, read-only classifier.
pub type ClassifierHandle = Arc<ClassifierArtifact>;

/// A tree node. Children always have larger indices than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Go left when `x[feature] <= threshold`, right otherwise.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// One regression tree; the root is node 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// A single-leaf tree.
    pub fn leaf(value: f64) -> Self {
        Self {
            nodes: vec![Node::Leaf(value)],
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {} uses feature {}", index, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has a non-finite threshold", index));
                    }
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(format!("node {} has child {}", index, child));
                        }
                    }
                }
                Node::Leaf(value) if !value.is_finite() => {
                    return Err(format!("leaf {} is not finite", index));
                }
                Node::Leaf(_) => {}
            }
        }
        Ok(())
    }

    /// Leaf value reached by `x`.
    fn evaluate(&self, x: &FeatureVector) -> Result<f64, ModelError> {
        let mut index = 0;
        // A validated tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(Node::Leaf(value)) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        Err(ModelError::Prediction(format!(
            "tree walk left the node table at {}",
            index
        )))
    }
}

/// Per-class boosted trees: class score = base score + sum of leaf values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_scores: Vec<f64>,
    /// `trees[class]` holds the trees of one class
    pub trees: Vec<Vec<Tree>>,
}

impl TreeEnsemble {
    pub fn num_classes(&self) -> usize {
        self.base_scores.len()
    }

    fn validate(&self) -> Result<(), String> {
        if self.base_scores.is_empty() {
            return Err("no classes".to_string());
        }
        if let Some(class) = self.base_scores.iter().position(|b| !b.is_finite()) {
            return Err(format!("base score of class {} is not finite", class));
        }
        if self.trees.len() != self.base_scores.len() {
            return Err(format!(
                "{} base scores but {} tree groups",
                self.base_scores.len(),
                self.trees.len()
            ));
        }
        for (class, trees) in self.trees.iter().enumerate() {
            for (i, tree) in trees.iter().enumerate() {
                tree.validate()
                    .map_err(|e| format!("class {} tree {}: {}", class, i, e))?;
            }
        }
        Ok(())
    }

    /// Softmax class probabilities for one feature vector.
    pub fn probabilities(&self, x: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let mut scores = Vec::with_capacity(self.num_classes());
        for (base, trees) in self.base_scores.iter().zip(&self.trees) {
            let mut score = *base;
            for tree in trees {
                score += tree.evaluate(x)?;
            }
            scores.push(score);
        }

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(ModelError::Prediction("non-finite class scores".to_string()));
        }
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(ModelError::Prediction(
                "class probabilities do not normalize".to_string(),
            ));
        }
        Ok(exps.into_iter().map(|e| e / sum).collect())
    }
}

/// Arg-max class of one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub level: HeadingLevel,
    /// Probability of the predicted class
    pub probability: f64,
}

/// The serialized classifier: label mapping plus the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub version: u32,
    /// Label name (`"H1"`, `"O"`, ...) to class index
    pub labels: BTreeMap<String, usize>,
    pub model: TreeEnsemble,
}

impl ClassifierArtifact {
    /// Build and validate an artifact.
    pub fn new(labels: BTreeMap<String, usize>, model: TreeEnsemble) -> Result<Self, ModelError> {
        let artifact = Self {
            version: ARTIFACT_VERSION,
            labels,
            model,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Load an artifact file into a shareable handle.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ClassifierHandle, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        let file = File::open(path).map_err(|e| ModelError::Decode(e.to_string()))?;
        let artifact: ClassifierArtifact = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        artifact.validate()?;

        log::info!(
            "Loaded classifier from {} ({} classes)",
            path.display(),
            artifact.model.num_classes()
        );
        Ok(Arc::new(artifact))
    }

    /// Load an artifact if a path is given, falling back to `None` with a
    /// warning when it is missing or unusable.
    pub fn load_optional(path: Option<&Path>) -> Option<ClassifierHandle> {
        let path = path?;
        match Self::load(path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("{}; using heuristic levels only", e);
                None
            }
        }
    }

    /// Decode and validate an artifact from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ClassifierArtifact =
            bincode::deserialize(bytes).map_err(|e| ModelError::Decode(e.to_string()))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        bincode::serialize(self).map_err(|e| ModelError::Decode(e.to_string()))
    }

    /// Write the artifact to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let file = File::create(path.as_ref()).map_err(|e| ModelError::Decode(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self).map_err(|e| ModelError::Decode(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| ModelError::Decode(e.to_string()))
    }

    /// Check version, labels and tree structure.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ModelError::Invalid(format!(
                "unsupported version {} (expected {})",
                self.version, ARTIFACT_VERSION
            )));
        }
        self.model.validate().map_err(ModelError::Invalid)?;

        let classes = self.model.num_classes();
        let mut seen = vec![false; classes];
        for (name, &index) in &self.labels {
            name.parse::<HeadingLevel>()
                .map_err(|e| ModelError::Invalid(e.to_string()))?;
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(ModelError::Invalid(format!(
                        "class {} has more than one label",
                        index
                    )))
                }
                None => {
                    return Err(ModelError::Invalid(format!(
                        "label {} maps to class {} of {}",
                        name, index, classes
                    )))
                }
            }
        }
        if self.labels.len() != classes {
            return Err(ModelError::Invalid(format!(
                "{} labels for {} classes",
                self.labels.len(),
                classes
            )));
        }
        Ok(())
    }

    /// Predict the level of one feature vector.
    pub fn predict(&self, x: &FeatureVector) -> Result<Prediction, ModelError> {
        let probabilities = self.model.probabilities(x)?;

        let (class, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .ok_or_else(|| ModelError::Prediction("no classes".to_string()))?;

        let name = self
            .labels
            .iter()
            .find(|(_, index)| **index == class)
            .map(|(name, _)| name)
            .ok_or_else(|| ModelError::Prediction(format!("class {} has no label", class)))?;
        let level = name
            .parse::<HeadingLevel>()
            .map_err(|e| ModelError::Prediction(e.to_string()))?;

        Ok(Prediction { level, probability })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two classes (`O`, `H1`): H1 when the font size exceeds 15.
    pub(crate) fn font_size_model() -> ClassifierArtifact {
        let mut labels = BTreeMap::new();
        labels.insert("O".to_string(), 0);
        labels.insert("H1".to_string(), 1);
        let split = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 15.0,
                left: 1,
                right: 2,
            },
            Node::Leaf(-2.0),
            Node::Leaf(2.0),
        ]);
        let model = TreeEnsemble {
            base_scores: vec![0.0, 0.0],
            trees: vec![vec![Tree::leaf(0.0)], vec![split]],
        };
        ClassifierArtifact::new(labels, model).unwrap()
    }

    fn features(font_size: f64) -> FeatureVector {
        [font_size, 0.0, 0.0, 10.0, 0.0, 0.0, 0.1, 0.0]
    }

    #[test]
    fn test_predict_argmax_and_softmax() {
        let model = font_size_model();

        let big = model.predict(&features(20.0)).unwrap();
        assert_eq!(big.level, HeadingLevel::H1);
        let expected = 2.0f64.exp() / (1.0 + 2.0f64.exp());
        assert!((big.probability - expected).abs() < 1e-12);

        let small = model.predict(&features(15.0)).unwrap();
        assert_eq!(small.level, HeadingLevel::NotHeading);
    }

    #[test]
    fn test_unnormalizable_scores_fail_prediction() {
        // Built without validation, as a corrupted in-memory model would be.
        let mut model = font_size_model();
        model.model.base_scores = vec![f64::NAN, 0.0];
        assert!(matches!(
            model.predict(&features(20.0)),
            Err(ModelError::Prediction(_))
        ));
    }

    #[test]
    fn test_bytes_round_trip() {
        let model = font_size_model();
        let restored = ClassifierArtifact::from_bytes(&model.to_bytes().unwrap()).unwrap();
        assert_eq!(restored, model);
    }

    #[test]
    fn test_validation_rejects_bad_artifacts() {
        let mut bad_feature = font_size_model();
        bad_feature.model.trees[1][0].nodes[0] = Node::Split {
            feature: 8,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(matches!(bad_feature.validate(), Err(ModelError::Invalid(_))));

        let mut backward = font_size_model();
        backward.model.trees[1][0].nodes[0] = Node::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(matches!(backward.validate(), Err(ModelError::Invalid(_))));

        let mut bad_label = font_size_model();
        bad_label.labels.insert("H9".to_string(), 1);
        assert!(matches!(bad_label.validate(), Err(ModelError::Invalid(_))));

        let mut out_of_range = font_size_model();
        out_of_range.labels.insert("H2".to_string(), 5);
        assert!(matches!(out_of_range.validate(), Err(ModelError::Invalid(_))));

        let mut old = font_size_model();
        old.version = 0;
        assert!(matches!(old.validate(), Err(ModelError::Invalid(_))));

        let mut nan_base = font_size_model();
        nan_base.model.base_scores[0] = f64::NAN;
        assert!(matches!(nan_base.validate(), Err(ModelError::Invalid(_))));
        assert!(ClassifierArtifact::new(nan_base.labels.clone(), nan_base.model).is_err());

        let mut infinite_base = font_size_model();
        infinite_base.model.base_scores[1] = f64::INFINITY;
        assert!(matches!(infinite_base.validate(), Err(ModelError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_and_garbage() {
        assert!(matches!(
            ClassifierArtifact::load("/nonexistent/model.bin"),
            Err(ModelError::NotFound(_))
        ));
        let missing = Path::new("/nonexistent/model.bin");
        assert!(ClassifierArtifact::load_optional(Some(missing)).is_none());
        assert!(ClassifierArtifact::load_optional(None).is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"\x01\x02").unwrap();
        assert!(matches!(
            ClassifierArtifact::load(&path),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        font_size_model().save(&path).unwrap();
        let handle = ClassifierArtifact::load(&path).unwrap();
        assert_eq!(*handle, font_size_model());
    }
}
