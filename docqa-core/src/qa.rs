//! Model seams for the two answering strategies.

use async_trait::async_trait;

use crate::error::Result;

/// A fast extractive question-answering model.
///
/// Given a question and a short context, returns the best contiguous span of
/// the context as the answer. `Ok(None)` means the model confidently found no
/// span — distinct from `Err`, which means the model call itself failed. The
/// router falls through to generation in both cases but reports them
/// differently.
#[async_trait]
pub trait ExtractiveModel: Send + Sync {
    /// Extract the best answer span from `context` for `question`.
    async fn extract(&self, context: &str, question: &str) -> Result<Option<String>>;
}

/// A slower generative reasoning model.
///
/// Given a full prompt (instructions, document context, and question), returns
/// the raw completion text. The router post-processes the completion, so
/// implementations that echo the prompt back are fine.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
