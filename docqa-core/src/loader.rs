//! Document loading boundary.
//!
//! Text extraction (PDF parsing, OCR fallback, Word/Excel) lives outside the
//! core: the pipeline only needs a mapping from a file to plain text. The
//! [`DocumentLoader`] trait is that boundary; [`PlainTextLoader`] ships
//! in-core for plain text formats and fails fast on anything else.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Metadata reported by a loader alongside the extracted text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadMetadata {
    /// The detected source format (usually the file extension).
    pub format: String,
    /// Whether an OCR fallback produced the text.
    pub ocr_used: bool,
}

/// Extracts plain text from a document file.
///
/// Implementations must fail with a descriptive error on unsupported formats
/// before any downstream work begins, and must signal via [`LoadMetadata`]
/// whether OCR fallback was used.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load a document, returning its plain text and format metadata.
    async fn load(&self, path: &Path) -> Result<(String, LoadMetadata)>;
}

/// File extensions accepted by [`PlainTextLoader`].
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

/// A loader for plain text documents (`.txt`, `.md`, `.text`).
///
/// Anything else is [`QaError::UnsupportedFormat`]; richer extraction
/// backends plug in behind [`DocumentLoader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextLoader;

impl PlainTextLoader {
    /// Create a plain text loader.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for PlainTextLoader {
    async fn load(&self, path: &Path) -> Result<(String, LoadMetadata)> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "unknown".to_string());

        if !TEXT_EXTENSIONS.contains(&format.as_str()) {
            return Err(QaError::UnsupportedFormat { path: path.to_path_buf(), format });
        }

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| QaError::Io { path: path.to_path_buf(), source })?;

        Ok((text, LoadMetadata { format, ocr_used: false }))
    }
}
