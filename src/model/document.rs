//! Document-level types: the title plus the outline forest.

use serde::{Deserialize, Serialize};

use super::{HeadingCandidate, HeadingLevel};

/// The outline of one PDF, as written to `<stem>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title (padded, see [`crate::analysis::title`])
    pub title: String,

    /// Top-level outline nodes in reading order
    #[serde(default)]
    pub outline: Vec<OutlineNode>,
}

impl Document {
    /// Create a document with an empty outline.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            outline: Vec::new(),
        }
    }

    /// Check if the outline has no nodes.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Get the total number of nodes (including nested).
    pub fn total_nodes(&self) -> usize {
        fn count(nodes: &[OutlineNode]) -> usize {
            nodes.iter().map(|node| 1 + count(&node.children)).sum()
        }
        count(&self.outline)
    }

    /// All nodes in depth-first pre-order, which is reading order.
    pub fn flatten(&self) -> Vec<&OutlineNode> {
        fn walk<'a>(nodes: &'a [OutlineNode], out: &mut Vec<&'a OutlineNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::with_capacity(self.total_nodes());
        walk(&self.outline, &mut out);
        out
    }
}

fn default_confidence() -> f64 {
    1.0
}

/// A heading placed in the outline tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    pub level: HeadingLevel,

    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,

    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Child nodes
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a leaf node.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            confidence: 1.0,
            children: Vec::new(),
        }
    }

    /// Add a child node.
    pub fn add_child(&mut self, child: OutlineNode) {
        self.children.push(child);
    }
}

impl From<HeadingCandidate> for OutlineNode {
    fn from(candidate: HeadingCandidate) -> Self {
        Self {
            level: candidate.level,
            text: candidate.text,
            page: candidate.page,
            confidence: candidate.confidence,
            children: Vec::new(),
        }
    }
}
