//! Heading analysis: from text lines to a leveled outline.
//!
//! The stages run in a fixed order. Language detection and redundancy flags
//! feed the [`HeadingClassifier`]; its candidates go to [`assemble`]. The
//! title is picked independently from the raw lines.

pub mod classifier;
pub mod features;
pub mod hierarchy;
pub mod language;
pub mod model;
pub mod redundancy;
pub mod rules;
pub mod title;

pub use classifier::{DedupPolicy, HeadingClassifier, LevelStrategy, OverlayOutcome};
pub use features::{line_features, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use hierarchy::assemble;
pub use language::{detect_language, Language, Script};
pub use model::{ClassifierArtifact, ClassifierHandle, Prediction, TreeEnsemble};
pub use redundancy::{EmbeddingProvider, HashingEmbedder, RedundancyFilter};
pub use rules::{HeadingRules, WordRange};
pub use title::TitleDetector;
