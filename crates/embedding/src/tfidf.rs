//! TF-IDF index — pure Rust, zero new dependencies.
//!
//! Tokenizes a corpus, builds a first-seen-order vocabulary and per-term
//! document frequencies, and produces dense TF-IDF vectors normalized to
//! unit length so cosine similarity is a plain dot product.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{dot, normalize, tokenize, Embedding, MatchResult};

/// Immutable vector-space view of a corpus.
///
/// Built in one shot by [`TfIdfIndex::build`]; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    /// term → dimension index
    vocabulary: HashMap<String, usize>,
    /// Number of documents containing each term, by dimension.
    document_frequency: Vec<usize>,
    /// One unit (or zero) vector per document, in corpus order.
    vectors: Vec<Embedding>,
}

impl TfIdfIndex {
    /// Build from document texts, in corpus order.
    pub fn build<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<usize> = Vec::new();

        for tokens in &tokenized {
            let mut seen: HashSet<usize> = HashSet::new();
            for term in tokens {
                let idx = match vocabulary.get(term) {
                    Some(&idx) => idx,
                    None => {
                        let idx = vocabulary.len();
                        vocabulary.insert(term.clone(), idx);
                        document_frequency.push(0);
                        idx
                    }
                };
                if seen.insert(idx) {
                    document_frequency[idx] += 1;
                }
            }
        }

        let mut index = Self {
            vocabulary,
            document_frequency,
            vectors: Vec::with_capacity(tokenized.len()),
        };
        let n = tokenized.len().max(1);
        for tokens in &tokenized {
            let vector = index.weigh(tokens, n);
            index.vectors.push(vector);
        }

        debug!(
            documents = index.vectors.len(),
            terms = index.vocabulary.len(),
            "built tf-idf index"
        );
        index
    }

    /// `ln(N / (1 + df)) + 1`
    fn idf(&self, idx: usize, n: usize) -> f32 {
        (n as f32 / (1 + self.document_frequency[idx]) as f32).ln() + 1.0
    }

    /// TF-IDF vector for a token sequence, unit length or all zeros.
    ///
    /// TF is normalized by the number of in-vocabulary tokens; for documents
    /// every token is in the vocabulary, so this is the sequence length.
    fn weigh(&self, tokens: &[String], n: usize) -> Embedding {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let mut vector = vec![0.0f32; self.vocabulary.len()];
        let total: usize = counts.values().sum();
        if total == 0 {
            return vector;
        }
        for (&idx, &count) in &counts {
            vector[idx] = (count as f32 / total as f32) * self.idf(idx, n);
        }
        normalize(&mut vector);
        vector
    }

    /// Project a query's tokens into the index's vector space.
    ///
    /// Terms outside the vocabulary contribute nothing; if none are known the
    /// result is the zero vector.
    pub fn embed_tokens(&self, tokens: &[String]) -> Embedding {
        self.weigh(tokens, self.vectors.len().max(1))
    }

    /// Tokenize and embed free text.
    #[cfg(test)]
    pub fn embed(&self, text: &str) -> Embedding {
        self.embed_tokens(&tokenize(text))
    }

    /// Documents with similarity strictly above zero, best first.
    ///
    /// The sort is stable, so equal scores keep corpus order. At most `k`
    /// results are returned.
    pub fn search_top_k(&self, query: &[f32], k: usize) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| MatchResult {
                index,
                score: dot(query, v),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        results.retain(|r| r.score > 0.0);
        results
    }

    /// Dimension index of a term, if known.
    #[cfg(test)]
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Document frequency of a term (0 when unknown).
    #[cfg(test)]
    pub fn document_frequency(&self, term: &str) -> usize {
        self.term_index(term)
            .map(|idx| self.document_frequency[idx])
            .unwrap_or(0)
    }

    /// Document vectors, in corpus order.
    pub fn vectors(&self) -> &[Embedding] {
        &self.vectors
    }

    /// Vocabulary size (vector dimensionality).
    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
