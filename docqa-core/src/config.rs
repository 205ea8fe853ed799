//! Configuration for the document QA pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Default message returned when the answer is not in the document.
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "The document does not contain this information.";

/// Default message returned when no document has been indexed yet.
pub const DEFAULT_NOT_READY_MESSAGE: &str = "Please upload a document first.";

/// Configuration parameters for the document QA pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Lower clamp for the adaptive chunk size, in characters.
    pub min_chunk_size: usize,
    /// Upper clamp for the adaptive chunk size, in characters.
    pub max_chunk_size: usize,
    /// Chunk size used when the file size gives no better signal.
    pub target_chunk_size: usize,
    /// Character budget for the sentence overlap between consecutive passages.
    pub chunk_overlap: usize,
    /// Number of passages retrieved per question.
    pub top_k: usize,
    /// Number of retrieved passages assembled into the answer context.
    pub context_passages: usize,
    /// Character budget for the assembled context.
    pub context_budget: usize,
    /// Generative replies at or below this length (after trimming) are
    /// treated as "no answer".
    pub min_answer_len: usize,
    /// Message returned when the document does not contain the answer.
    pub not_found_message: String,
    /// Message returned when `ask` is called before a successful upload.
    pub not_ready_message: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: 100,
            max_chunk_size: 1000,
            target_chunk_size: 300,
            chunk_overlap: 50,
            top_k: 5,
            context_passages: 2,
            context_budget: 2000,
            min_answer_len: 3,
            not_found_message: DEFAULT_NOT_FOUND_MESSAGE.to_string(),
            not_ready_message: DEFAULT_NOT_READY_MESSAGE.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the lower clamp for the adaptive chunk size.
    pub fn min_chunk_size(mut self, size: usize) -> Self {
        self.config.min_chunk_size = size;
        self
    }

    /// Set the upper clamp for the adaptive chunk size.
    pub fn max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    /// Set the chunk size used when the file size gives no better signal.
    pub fn target_chunk_size(mut self, size: usize) -> Self {
        self.config.target_chunk_size = size;
        self
    }

    /// Set the overlap budget between consecutive passages in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of passages retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the number of retrieved passages assembled into the context.
    pub fn context_passages(mut self, n: usize) -> Self {
        self.config.context_passages = n;
        self
    }

    /// Set the character budget for the assembled context.
    pub fn context_budget(mut self, budget: usize) -> Self {
        self.config.context_budget = budget;
        self
    }

    /// Set the message returned when the answer is not in the document.
    pub fn not_found_message(mut self, message: impl Into<String>) -> Self {
        self.config.not_found_message = message.into();
        self
    }

    /// Set the message returned when no document has been indexed yet.
    pub fn not_ready_message(mut self, message: impl Into<String>) -> Self {
        self.config.not_ready_message = message.into();
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if:
    /// - `min_chunk_size >= max_chunk_size`
    /// - `target_chunk_size` lies outside `[min_chunk_size, max_chunk_size]`
    /// - `chunk_overlap >= min_chunk_size`
    /// - `top_k`, `context_passages`, or `context_budget` is zero
    pub fn build(self) -> Result<PipelineConfig> {
        let c = &self.config;
        if c.min_chunk_size >= c.max_chunk_size {
            return Err(QaError::Config(format!(
                "min_chunk_size ({}) must be less than max_chunk_size ({})",
                c.min_chunk_size, c.max_chunk_size
            )));
        }
        if c.target_chunk_size < c.min_chunk_size || c.target_chunk_size > c.max_chunk_size {
            return Err(QaError::Config(format!(
                "target_chunk_size ({}) must lie within [{}, {}]",
                c.target_chunk_size, c.min_chunk_size, c.max_chunk_size
            )));
        }
        if c.chunk_overlap >= c.min_chunk_size {
            return Err(QaError::Config(format!(
                "chunk_overlap ({}) must be less than min_chunk_size ({})",
                c.chunk_overlap, c.min_chunk_size
            )));
        }
        if c.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if c.context_passages == 0 {
            return Err(QaError::Config("context_passages must be greater than zero".to_string()));
        }
        if c.context_budget == 0 {
            return Err(QaError::Config("context_budget must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn rejects_overlap_larger_than_min_chunk() {
        let err = PipelineConfig::builder().chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, QaError::Config(_)));
    }

    #[test]
    fn rejects_target_outside_clamp_range() {
        let err = PipelineConfig::builder().target_chunk_size(2000).build().unwrap_err();
        assert!(matches!(err, QaError::Config(_)));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = PipelineConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, QaError::Config(_)));
    }
}
