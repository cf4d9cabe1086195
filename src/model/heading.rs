//! Heading levels and classified candidates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Level assigned to a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HeadingLevel {
    /// Document title line
    #[serde(rename = "title")]
    Title,
    H1,
    H2,
    H3,
    H4,
    /// Not a heading
    #[serde(rename = "O")]
    NotHeading,
}

impl HeadingLevel {
    /// All levels, in label order.
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::Title,
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::NotHeading,
    ];

    /// Canonical label string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::Title => "title",
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::NotHeading => "O",
        }
    }

    /// Whether the level marks a heading (anything but `O`).
    pub fn is_heading(&self) -> bool {
        !matches!(self, HeadingLevel::NotHeading)
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label string names no level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown heading level: {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for HeadingLevel {
    type Err = ParseLevelError;

    /// Parse a label case-insensitively (`"h2"`, `"TITLE"`, `"o"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        HeadingLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for HeadingLevel {
    /// Labels in hand-written gold files vary in case; accept any.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A line that survived gating and received a heading level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingCandidate {
    pub level: HeadingLevel,
    pub text: String,
    /// 1-based page number
    pub page: u32,
    /// 1.0 for heuristic decisions, the model probability for overlay decisions
    pub confidence: f64,
    /// Vertical position on the page (top-down)
    pub top: f32,
}

impl HeadingCandidate {
    /// Create a heuristic candidate (confidence 1.0).
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32, top: f32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            confidence: 1.0,
            top,
        }
    }

    /// Set the confidence, clamped to [0, 1].
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}
