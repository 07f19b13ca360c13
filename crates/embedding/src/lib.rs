//! Embedding infrastructure for law retrieval.
//!
//! A tokenizer shared by indexing and querying, vector helpers, and the
//! TF-IDF index that turns the law corpus into unit vectors for cosine
//! similarity search.

pub mod tfidf;

pub use tfidf::TfIdfIndex;

/// A single embedding vector.
pub type Embedding = Vec<f32>;

/// Result of a similarity search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Position of the document in corpus order.
    pub index: usize,
    /// Cosine similarity score.
    pub score: f32,
}

/// Split text into lowercase tokens: maximal runs of alphanumeric characters.
///
/// Everything else is a separator and is dropped, so `"hot-water"` becomes
/// `["hot", "water"]`. No stemming, no stop words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Normalize a vector to unit length (in-place). Zero vectors stay zero.
pub fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product; cosine similarity when both sides are unit vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Whether every component is exactly zero.
pub fn is_zero(v: &[f32]) -> bool {
    v.iter().all(|&x| x == 0.0)
}
