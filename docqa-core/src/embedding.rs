//! Embedding provider trait for mapping text to fixed-length vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-length numeric vectors.
///
/// The core treats embedding as a pure, side-effect-free function: the same
/// text must always map to the same vector within a provider instance.
/// Implementations wrap specific backends (HTTP inference services, local
/// models) behind this interface; the deterministic
/// [`MockEmbedder`](crate::mock::MockEmbedder) ships for tests and demos.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_core::EmbeddingProvider;
///
/// let vector = provider.embed("what is the warranty period?").await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text inputs, order-preserving, one vector per input.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially. Backends with native batching should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Dimensionality of the vectors produced by this provider.
    fn dimensions(&self) -> usize;
}
