//! Similarity-based passage retrieval.
//!
//! The [`Retriever`] owns the single published index: the ordered passages of
//! the current document plus their matching matrix of embedding vectors. A
//! rebuild constructs the new index fully off to the side and publishes it in
//! one write-lock swap, so concurrent readers never observe a half-built
//! index.

use std::cmp::Ordering;

use tokio::sync::RwLock;
use tracing::info;

use crate::document::{Passage, ScoredPassage};
use crate::error::{QaError, Result};

/// Guards against division by zero for degenerate zero vectors.
const NORM_EPSILON: f32 = 1e-10;

/// The published index: passages paired positionally with their vectors.
#[derive(Debug)]
struct Index {
    passages: Vec<Passage>,
    vectors: Vec<Vec<f32>>,
}

/// Retrieves the passages most similar to a query vector.
///
/// One index exists at a time; building a new one discards the old one
/// atomically from the caller's perspective.
#[derive(Debug, Default)]
pub struct Retriever {
    index: RwLock<Option<Index>>,
}

impl Retriever {
    /// Create a retriever with no index built.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current index with a new one.
    ///
    /// Passages and vectors are paired by position and must never be
    /// reordered independently.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Index`] if the passage and vector counts differ or
    /// the vectors are not all of the same dimension. The previous index is
    /// left untouched on error.
    pub async fn build_index(&self, passages: Vec<Passage>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if passages.len() != vectors.len() {
            return Err(QaError::Index(format!(
                "passage count ({}) does not match vector count ({})",
                passages.len(),
                vectors.len()
            )));
        }
        if let Some(dims) = vectors.first().map(Vec::len) {
            if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
                return Err(QaError::Index(format!(
                    "inconsistent vector dimensions: expected {dims}, found {}",
                    bad.len()
                )));
            }
        }

        let passage_count = passages.len();
        let index = Index { passages, vectors };
        *self.index.write().await = Some(index);
        info!(passage_count, "index published");
        Ok(())
    }

    /// Drop the current index, if any.
    pub async fn clear(&self) {
        *self.index.write().await = None;
    }

    /// Whether an index with at least one passage is published.
    pub async fn is_ready(&self) -> bool {
        self.index.read().await.as_ref().is_some_and(|i| !i.passages.is_empty())
    }

    /// Return the `top_k` passages most similar to the query vector, ordered
    /// by descending cosine similarity; ties broken by passage ordinal.
    ///
    /// An empty result means "nothing retrievable", not a fault: it is
    /// returned when no index has been built, the index is empty, or
    /// `top_k` is zero. A `top_k` larger than the index silently clamps.
    pub async fn get_relevant_chunks(&self, query: &[f32], top_k: usize) -> Vec<ScoredPassage> {
        let guard = self.index.read().await;
        let Some(index) = guard.as_ref() else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, f32)> = index
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(v, query)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(i, score)| ScoredPassage { passage: index.passages[i].clone(), score })
            .collect()
    }
}

/// Cosine similarity with an epsilon guard for zero-magnitude vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (norm_a * norm_b + NORM_EPSILON)
}
