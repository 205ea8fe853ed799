//! HTTP-backed providers for embedding, extraction, and generation.
//!
//! This module is only available when the `http` feature is enabled. All
//! three providers talk JSON over `reqwest` to OpenAI-compatible or
//! HuggingFace-style inference endpoints and accept a caller-supplied
//! `reqwest::Client`, which is also where request timeouts belong —
//! generative inference latency is unbounded in principle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::qa::{ExtractiveModel, GenerativeModel};

/// The default OpenAI embeddings endpoint.
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The default OpenAI chat completions endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default embedding model.
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

/// The default dimensionality for `text-embedding-3-small`.
const DEFAULT_EMBED_DIMENSIONS: usize = 1536;

/// The default generative model.
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Extractive spans scoring below this confidence map to "no span".
const DEFAULT_MIN_SPAN_SCORE: f32 = 0.1;

fn embedding_error(message: impl Into<String>) -> QaError {
    QaError::Embedding { provider: "Http".into(), message: message.into() }
}

fn model_error(model: &str, message: impl Into<String>) -> QaError {
    QaError::Model { model: model.into(), message: message.into() }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// An [`EmbeddingProvider`] backed by an OpenAI-compatible `/v1/embeddings`
/// endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_core::http::HttpEmbedder;
///
/// let embedder = HttpEmbedder::from_env()?;
/// let vector = embedder.embed("hello world").await?;
/// ```
pub struct HttpEmbedder {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl HttpEmbedder {
    /// Create a new embedder with the given API key and default endpoint,
    /// model, and dimensions.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(embedding_error("API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url: OPENAI_EMBEDDINGS_URL.into(),
            api_key,
            model: DEFAULT_EMBED_MODEL.into(),
            dimensions: DEFAULT_EMBED_DIMENSIONS,
        })
    }

    /// Create a new embedder using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| embedding_error("OPENAI_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Override the endpoint URL (for self-hosted OpenAI-compatible servers).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the model name and its dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Use a pre-configured `reqwest` client (timeouts, proxies, ...).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn request(&self, inputs: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let expected = inputs.len();
        let body = EmbeddingRequest { model: &self.model, input: inputs };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| embedding_error(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(%status, "embedding endpoint returned an error");
            return Err(embedding_error(format!("endpoint returned {status}: {text}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| embedding_error(format!("malformed response: {e}")))?;

        if parsed.data.len() != expected {
            return Err(embedding_error(format!(
                "expected {expected} vectors, got {}",
                parsed.data.len()
            )));
        }

        debug!(count = parsed.data.len(), "embedded batch");
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.request(vec![text]).await?;
        vectors.pop().ok_or_else(|| embedding_error("endpoint returned no vector"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts.to_vec()).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// Extractive QA
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ExtractRequest<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct ExtractResponse {
    answer: String,
    #[serde(default)]
    score: f32,
}

/// An [`ExtractiveModel`] backed by a HuggingFace-style question-answering
/// endpoint: POST `{question, context}`, receive `{answer, score}`.
///
/// A span whose confidence score falls below the threshold maps to
/// `Ok(None)` — the model confidently found nothing worth returning.
pub struct HttpExtractor {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    min_score: f32,
}

impl HttpExtractor {
    /// Create a new extractor for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key: None,
            min_score: DEFAULT_MIN_SPAN_SCORE,
        }
    }

    /// Set a bearer token for the endpoint.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the minimum confidence score for accepting a span.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Use a pre-configured `reqwest` client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ExtractiveModel for HttpExtractor {
    async fn extract(&self, context: &str, question: &str) -> Result<Option<String>> {
        let mut request = self.client.post(&self.url).json(&ExtractRequest { question, context });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| model_error("HttpExtractor", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(model_error("HttpExtractor", format!("endpoint returned {status}: {text}")));
        }

        let parsed: ExtractResponse = response
            .json()
            .await
            .map_err(|e| model_error("HttpExtractor", format!("malformed response: {e}")))?;

        debug!(score = parsed.score, "extractive span returned");
        if parsed.answer.trim().is_empty() || parsed.score < self.min_score {
            return Ok(None);
        }
        Ok(Some(parsed.answer))
    }
}

// ---------------------------------------------------------------------------
// Generative QA
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// A [`GenerativeModel`] backed by an OpenAI-compatible chat completions
/// endpoint.
pub struct HttpGenerator {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpGenerator {
    /// Create a new generator with the given API key and defaults
    /// (`gpt-4o-mini`, temperature 0.3, 120 completion tokens).
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(model_error("HttpGenerator", "API key must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            url: OPENAI_CHAT_URL.into(),
            api_key,
            model: DEFAULT_CHAT_MODEL.into(),
            temperature: 0.3,
            max_tokens: 120,
        })
    }

    /// Create a new generator using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            model_error("HttpGenerator", "OPENAI_API_KEY environment variable not set")
        })?;
        Self::new(api_key)
    }

    /// Override the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Override the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a pre-configured `reqwest` client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl GenerativeModel for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| model_error("HttpGenerator", format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(model_error("HttpGenerator", format!("endpoint returned {status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| model_error("HttpGenerator", format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| model_error("HttpGenerator", "endpoint returned no choices"))
    }
}
