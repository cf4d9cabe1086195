//! Semantic redundancy filtering.
//!
//! Lines whose embedding sits almost on top of the document centroid carry
//! no structure of their own (running headers, boilerplate repeated on every
//! page) and are dropped before level classification.

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::error::{Error, Result};
use crate::model::TextLine;

/// Default cosine-similarity threshold above which a line is redundant.
pub const DEFAULT_REDUNDANCY_THRESHOLD: f32 = 0.9;

/// Default dimension of the [`HashingEmbedder`].
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Trait for embedding backends.
///
/// Implement this to plug a sentence-embedding model into the filter. All
/// vectors returned by one provider must have [`dimension`](Self::dimension)
/// components.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Embed several texts.
    ///
    /// Default implementation calls [`embed`](Self::embed) in a loop.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Deterministic feature-hashing embedder.
///
/// Hashes lowercase character trigrams and word unigrams into a signed,
/// L2-normalized vector. No model files, same output on every run.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    const TRIGRAM_SEED: u64 = 0x7472_6967;
    const WORD_SEED: u64 = 0x776f_7264;

    /// Create an embedder with the given dimension (at least 1).
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn add(&self, vector: &mut [f32], feature: &str, seed: u64) {
        let hash = xxh3_64_with_seed(feature.as_bytes(), seed);
        let index = (hash % self.dim as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dim];
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return Ok(vector);
        }

        for word in lower.split_whitespace() {
            self.add(&mut vector, word, Self::WORD_SEED);
        }

        let padded: Vec<char> = std::iter::once(' ')
            .chain(lower.chars())
            .chain(std::iter::once(' '))
            .collect();
        let mut gram = String::with_capacity(12);
        for window in padded.windows(3) {
            gram.clear();
            gram.extend(window);
            self.add(&mut vector, &gram, Self::TRIGRAM_SEED);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Cosine similarity; 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Flags lines that are semantically indistinguishable from the whole document.
pub struct RedundancyFilter {
    provider: Box<dyn EmbeddingProvider>,
    threshold: f32,
}

impl RedundancyFilter {
    /// Create a filter over a provider with the default threshold.
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            threshold: DEFAULT_REDUNDANCY_THRESHOLD,
        }
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// The similarity threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// One flag per line: `true` when the line is redundant.
    ///
    /// Empty lines are never flagged and do not contribute to the centroid.
    pub fn flag(&self, lines: &[TextLine]) -> Result<Vec<bool>> {
        let mut flags = vec![false; lines.len()];

        let (indices, texts): (Vec<usize>, Vec<&str>) = lines
            .iter()
            .enumerate()
            .map(|(i, l)| (i, l.trimmed()))
            .filter(|(_, t)| !t.is_empty())
            .unzip();
        if texts.is_empty() {
            return Ok(flags);
        }

        let vectors = self.provider.embed_batch(&texts)?;
        let dim = self.provider.dimension();
        if vectors.len() != texts.len() || vectors.iter().any(|v| v.len() != dim) {
            return Err(Error::Embedding(format!(
                "provider returned {} vectors for {} texts (expected dimension {})",
                vectors.len(),
                texts.len(),
                dim
            )));
        }

        let mut centroid = vec![0.0f32; dim];
        for vector in &vectors {
            for (c, v) in centroid.iter_mut().zip(vector) {
                *c += v;
            }
        }
        let count = vectors.len() as f32;
        centroid.iter_mut().for_each(|c| *c /= count);

        for (index, vector) in indices.into_iter().zip(&vectors) {
            flags[index] = cosine_similarity(vector, &centroid) > self.threshold;
        }

        Ok(flags)
    }
}

impl std::fmt::Debug for RedundancyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedundancyFilter")
            .field("dimension", &self.provider.dimension())
            .field("threshold", &self.threshold)
            .finish()
    }
}
