//! # docqa-core
//!
//! The retrieval-and-answer-routing core of a document question-answering
//! assistant: adaptive chunking of heterogeneous documents, cosine-similarity
//! passage retrieval, and a two-path QA strategy that picks between an
//! extractive answerer and a generative reasoner per question.
//!
//! ## Overview
//!
//! A [`DocumentPipeline`] is a caller-owned session: upload a document and it
//! is chunked, embedded, and indexed; ask a question and the most relevant
//! passages are retrieved, the question is classified as factual or
//! conceptual, and the matching strategy produces an [`AnswerRecord`] —
//! always, even when the honest answer is "not in the document".
//!
//! The model boundaries are narrow async traits ([`EmbeddingProvider`],
//! [`ExtractiveModel`], [`GenerativeModel`], [`DocumentLoader`]):
//! deterministic mocks ship in [`mock`], and HTTP-backed implementations live
//! behind the `http` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_core::{DocumentPipeline, mock};
//!
//! let pipeline = DocumentPipeline::builder()
//!     .embedder(Arc::new(mock::MockEmbedder::default()))
//!     .extractive(Arc::new(mock::MockExtractor::new()))
//!     .generative(Arc::new(mock::MockGenerator::with_reply("See section 2.")))
//!     .build()?;
//!
//! let report = pipeline.upload("The warranty lasts two years.", None).await?;
//! assert_eq!(report.chunk_count, 1);
//!
//! let record = pipeline.ask("How long is the warranty?").await?;
//! println!("{} (via {})", record.answer, record.path);
//! ```
//!
//! ## Features
//!
//! - `http` — OpenAI-compatible and HuggingFace-style HTTP providers
//!   ([`http::HttpEmbedder`], [`http::HttpExtractor`], [`http::HttpGenerator`]).

pub mod chunking;
pub mod classifier;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod loader;
pub mod mock;
pub mod pipeline;
pub mod qa;
pub mod retriever;
pub mod router;

pub use chunking::AdaptiveChunker;
pub use classifier::{KeywordClassifier, QueryComplexity, QuestionClassifier, QuestionKind};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{AnswerRecord, Document, Passage, QaPath, ScoredPassage, UploadReport};
pub use embedding::EmbeddingProvider;
pub use error::{QaError, Result};
pub use loader::{DocumentLoader, LoadMetadata, PlainTextLoader};
pub use pipeline::{DocumentPipeline, PipelineBuilder};
pub use qa::{ExtractiveModel, GenerativeModel};
pub use retriever::Retriever;
pub use router::AnswerRouter;
