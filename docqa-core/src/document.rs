//! Data types for documents, passages, and answer records.

use serde::{Deserialize, Serialize};

/// A source document held in memory for the lifetime of its index.
///
/// Documents are ephemeral: uploading a new one supersedes the previous one
/// entirely, and nothing is persisted across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The raw text content of the document.
    pub text: String,
    /// Size of the original file in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// A tag describing the source format (`"txt"`, `"pdf"`, ...).
    pub format: String,
}

/// A contiguous span of document text chosen to respect sentence boundaries.
///
/// Passages are the unit of retrieval. Consecutive passages share an overlap
/// region: a suffix of one passage's sentences is repeated as a prefix of the
/// next, preserving context continuity across split boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    /// The text content of the passage.
    pub text: String,
    /// Build-order position within the document.
    ///
    /// The pairing between a passage and its embedding vector is positional,
    /// so passages and vectors must never be reordered independently.
    pub ordinal: usize,
}

impl Passage {
    /// Length of the passage text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the passage text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A retrieved [`Passage`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPassage {
    /// The retrieved passage.
    pub passage: Passage,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// Which strategy produced an answer.
///
/// Reporting-only: the tag is never used for control flow downstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QaPath {
    /// A deterministic pattern matcher (phone/email) found the answer.
    Regex,
    /// The extractive model selected a span of the context.
    Extractive,
    /// The generative model synthesized the answer.
    Generative,
    /// No strategy produced an answer (not-found or not-ready message).
    None,
}

impl std::fmt::Display for QaPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QaPath::Regex => "regex",
            QaPath::Extractive => "extractive",
            QaPath::Generative => "generative",
            QaPath::None => "none",
        };
        f.write_str(name)
    }
}

/// The output of one question: answer text, supporting evidence, and the
/// strategy that produced it.
///
/// Not persisted by the core; the caller decides whether to log it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// The answer text. Always present, even if it is an explicit
    /// not-found or upload-a-document-first message.
    pub answer: String,
    /// The passages used as evidence for the answer, in retrieval order.
    pub evidence: Vec<String>,
    /// Which QA path produced the answer.
    pub path: QaPath,
}

/// Summary of one upload: how the document was indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReport {
    /// Number of passages produced and indexed. Zero means the document was
    /// empty and the pipeline is not ready to answer questions.
    pub chunk_count: usize,
    /// The adaptive chunk size (in characters) used for this document.
    pub chunk_size_used: usize,
}
