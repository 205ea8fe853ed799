//! Pipeline orchestration: upload → chunk → embed → index, then
//! question → retrieve → route → answer.
//!
//! A [`DocumentPipeline`] is an explicit, caller-owned session object holding
//! one document's derived state. There is no global singleton: multiple
//! pipelines coexist, one per session. Re-uploading fully replaces prior
//! state — no incremental indexing, no merge of old and new passages.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::chunking::AdaptiveChunker;
use crate::classifier::{KeywordClassifier, QueryComplexity, QuestionClassifier};
use crate::config::PipelineConfig;
use crate::document::{AnswerRecord, QaPath, ScoredPassage, UploadReport};
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::loader::{DocumentLoader, PlainTextLoader};
use crate::qa::{ExtractiveModel, GenerativeModel};
use crate::retriever::Retriever;
use crate::router::AnswerRouter;

/// The document QA session: owns the active document's derived state and
/// sequences the upload and question workflows.
///
/// Construct one via [`DocumentPipeline::builder()`].
pub struct DocumentPipeline {
    config: Arc<PipelineConfig>,
    chunker: AdaptiveChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    loader: Arc<dyn DocumentLoader>,
    retriever: Retriever,
    router: AnswerRouter,
    /// Chunk size used for the current document, for reporting.
    chunk_size_used: RwLock<Option<usize>>,
}

impl std::fmt::Debug for DocumentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPipeline")
            .field("config", &self.config)
            .field("chunker", &self.chunker)
            .finish_non_exhaustive()
    }
}

impl DocumentPipeline {
    /// Create a new [`PipelineBuilder`].
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether a document has been indexed and questions can be answered.
    pub async fn is_ready(&self) -> bool {
        self.retriever.is_ready().await
    }

    /// Index a document given its raw text: chunk → embed → build index.
    ///
    /// Replaces any previously indexed document wholesale. An empty or
    /// whitespace-only document is a valid input producing zero passages;
    /// the pipeline is then not ready and [`ask`](Self::ask) reports it.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Embedding`] or [`QaError::Index`] if embedding or
    /// index construction fails. The previous document's index is cleared in
    /// that case, so a failed upload never leaves stale passages answerable.
    pub async fn upload(&self, text: &str, size_hint: Option<u64>) -> Result<UploadReport> {
        let chunk_size =
            self.chunker.calculate_chunk_size(text, size_hint, QueryComplexity::Medium);
        let passages = self.chunker.chunk(text, chunk_size);

        if passages.is_empty() {
            self.retriever.clear().await;
            *self.chunk_size_used.write().await = None;
            warn!("document produced no passages; pipeline is not ready");
            return Ok(UploadReport { chunk_count: 0, chunk_size_used: chunk_size });
        }

        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let vectors = match self.embedder.embed_batch(&texts).await {
            Ok(v) => v,
            Err(e) => {
                self.retriever.clear().await;
                *self.chunk_size_used.write().await = None;
                error!(error = %e, "embedding failed during upload");
                return Err(e);
            }
        };

        let chunk_count = passages.len();
        if let Err(e) = self.retriever.build_index(passages, vectors).await {
            self.retriever.clear().await;
            *self.chunk_size_used.write().await = None;
            error!(error = %e, "index build failed during upload");
            return Err(e);
        }
        *self.chunk_size_used.write().await = Some(chunk_size);

        info!(chunk_count, chunk_size, "document indexed");
        Ok(UploadReport { chunk_count, chunk_size_used: chunk_size })
    }

    /// Load a document from disk via the configured loader, then index it.
    ///
    /// The on-disk size feeds the adaptive chunk sizing.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::UnsupportedFormat`] or [`QaError::Io`] from the
    /// loader (fail-fast, before any chunking or embedding work), or any
    /// error from [`upload`](Self::upload).
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadReport> {
        let path = path.as_ref();
        let (text, metadata) = self.loader.load(path).await?;
        let size_hint = tokio::fs::metadata(path).await.ok().map(|m| m.len());
        info!(
            path = %path.display(),
            format = metadata.format,
            ocr_used = metadata.ocr_used,
            "document loaded"
        );
        self.upload(&text, size_hint).await
    }

    /// Answer a question over the indexed document.
    ///
    /// When no document is ready, returns the configured upload-first message
    /// with [`QaPath::None`] — a defined, non-fatal condition. Model-call
    /// failures inside the router degrade to the next strategy and never
    /// surface here.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Embedding`] if the question itself cannot be
    /// embedded — retrieval is impossible without a query vector.
    pub async fn ask(&self, question: &str) -> Result<AnswerRecord> {
        if !self.is_ready().await {
            return Ok(AnswerRecord {
                answer: self.config.not_ready_message.clone(),
                evidence: Vec::new(),
                path: QaPath::None,
            });
        }

        let query_vec = self.embedder.embed(question).await.map_err(|e| {
            error!(error = %e, "query embedding failed");
            e
        })?;

        let retrieved = self.retriever.get_relevant_chunks(&query_vec, self.config.top_k).await;
        let filtered = filter_by_word_overlap(question, retrieved, self.config.context_passages);

        Ok(self.router.answer(question, &filtered).await)
    }

    /// Chunk size used for the currently indexed document, if any.
    pub async fn chunk_size_used(&self) -> Option<usize> {
        *self.chunk_size_used.read().await
    }
}

/// Keep retrieved passages sharing at least one word with the question.
///
/// Similarity scores alone can surface passages with no lexical connection to
/// the question; this filter discards them. When nothing overlaps, the top
/// `fallback` passages are kept instead so the router still has context.
fn filter_by_word_overlap(
    question: &str,
    retrieved: Vec<ScoredPassage>,
    fallback: usize,
) -> Vec<ScoredPassage> {
    let question_words: Vec<String> = question
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect();

    let mut kept: Vec<ScoredPassage> = retrieved
        .iter()
        .filter(|scored| {
            let lower = scored.passage.text.to_lowercase();
            lower
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
                .any(|w| question_words.iter().any(|q| q == w))
        })
        .cloned()
        .collect();

    if kept.is_empty() {
        kept = retrieved.into_iter().take(fallback).collect();
    }
    kept
}

/// Builder for constructing a [`DocumentPipeline`].
///
/// The embedding provider and both models are required; the classifier,
/// loader, and config fall back to [`KeywordClassifier`],
/// [`PlainTextLoader`], and [`PipelineConfig::default`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    extractive: Option<Arc<dyn ExtractiveModel>>,
    generative: Option<Arc<dyn GenerativeModel>>,
    classifier: Option<Arc<dyn QuestionClassifier>>,
    loader: Option<Arc<dyn DocumentLoader>>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider (required).
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the extractive model (required).
    pub fn extractive(mut self, model: Arc<dyn ExtractiveModel>) -> Self {
        self.extractive = Some(model);
        self
    }

    /// Set the generative model (required).
    pub fn generative(mut self, model: Arc<dyn GenerativeModel>) -> Self {
        self.generative = Some(model);
        self
    }

    /// Set the question classifier.
    pub fn classifier(mut self, classifier: Arc<dyn QuestionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the document loader.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Build the [`DocumentPipeline`], validating that required components
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if the embedder or either model is
    /// missing.
    pub fn build(self) -> Result<DocumentPipeline> {
        let config = Arc::new(self.config.unwrap_or_default());
        let embedder = self
            .embedder
            .ok_or_else(|| QaError::Config("embedder is required".to_string()))?;
        let extractive = self
            .extractive
            .ok_or_else(|| QaError::Config("extractive model is required".to_string()))?;
        let generative = self
            .generative
            .ok_or_else(|| QaError::Config("generative model is required".to_string()))?;
        let classifier =
            self.classifier.unwrap_or_else(|| Arc::new(KeywordClassifier::default()));
        let loader = self.loader.unwrap_or_else(|| Arc::new(PlainTextLoader::new()));

        let chunker = AdaptiveChunker::from_config(&config);
        let router = AnswerRouter::new(classifier, extractive, generative, Arc::clone(&config));

        Ok(DocumentPipeline {
            config,
            chunker,
            embedder,
            loader,
            retriever: Retriever::new(),
            router,
            chunk_size_used: RwLock::new(None),
        })
    }
}
