//! Error types for the `docqa-core` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in document QA operations.
///
/// Model-call failures ([`QaError::Model`]) are recovered inside the answer
/// router and never escape [`ask`](crate::pipeline::DocumentPipeline::ask);
/// everything else represents a genuine fault the caller must handle.
#[derive(Debug, Error)]
pub enum QaError {
    /// The document format is not supported by the configured loader.
    ///
    /// Raised before any chunking or embedding work begins.
    #[error("Unsupported document format '{format}' for {path}")]
    UnsupportedFormat {
        /// Path to the offending document.
        path: PathBuf,
        /// The detected format (usually the file extension).
        format: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in an extractive or generative model call.
    #[error("Model error ({model}): {message}")]
    Model {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// The passage/vector pairing handed to the retriever is inconsistent.
    #[error("Index error: {0}")]
    Index(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A document could not be read from disk.
    #[error("Failed to read document {path}: {source}")]
    Io {
        /// Path to the document that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// A convenience result type for document QA operations.
pub type Result<T> = std::result::Result<T, QaError>;
