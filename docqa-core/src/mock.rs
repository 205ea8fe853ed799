//! Deterministic mock providers for tests, demos, and offline development.
//!
//! No network, no model weights: the embedder hashes text into a normalized
//! vector, the extractor runs a word-overlap heuristic, and the generator
//! replays a canned completion. All three have failure-injection constructors
//! so fallback paths can be exercised in tests.

use async_trait::async_trait;

use crate::chunking::split_sentences;
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::qa::{ExtractiveModel, GenerativeModel};

/// A deterministic hash-based [`EmbeddingProvider`].
///
/// The same text always maps to the same L2-normalized vector, so cosine
/// similarity is just the dot product. Texts sharing no content still get
/// distinct directions, which is enough for retrieval plumbing tests.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    fail: bool,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, fail: false }
    }

    /// Create a mock embedder whose every call fails.
    pub fn failing() -> Self {
        Self { dimensions: 8, fail: true }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(QaError::Embedding {
                provider: "Mock".into(),
                message: "injected failure".into(),
            });
        }

        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, v) in vector.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// What a [`MockExtractor`] does when asked for a span.
#[derive(Debug, Clone)]
enum ExtractBehavior {
    /// Return the context sentence sharing the most words with the question.
    Heuristic,
    /// Always return this span.
    Fixed(Option<String>),
    /// Always fail.
    Fail,
}

/// A deterministic [`ExtractiveModel`] for tests and demos.
#[derive(Debug, Clone)]
pub struct MockExtractor {
    behavior: ExtractBehavior,
}

impl MockExtractor {
    /// Create an extractor that returns the context sentence with the most
    /// question-word overlap, or no span when nothing overlaps.
    pub fn new() -> Self {
        Self { behavior: ExtractBehavior::Heuristic }
    }

    /// Create an extractor that always returns the given span.
    pub fn with_span(span: impl Into<String>) -> Self {
        Self { behavior: ExtractBehavior::Fixed(Some(span.into())) }
    }

    /// Create an extractor that confidently finds nothing.
    pub fn empty() -> Self {
        Self { behavior: ExtractBehavior::Fixed(None) }
    }

    /// Create an extractor whose every call fails.
    pub fn failing() -> Self {
        Self { behavior: ExtractBehavior::Fail }
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractiveModel for MockExtractor {
    async fn extract(&self, context: &str, question: &str) -> Result<Option<String>> {
        match &self.behavior {
            ExtractBehavior::Fixed(span) => Ok(span.clone()),
            ExtractBehavior::Fail => Err(QaError::Model {
                model: "MockExtractor".into(),
                message: "injected failure".into(),
            }),
            ExtractBehavior::Heuristic => {
                let question_words: Vec<String> = question
                    .to_lowercase()
                    .split_whitespace()
                    .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
                    .filter(|w| !w.is_empty())
                    .collect();

                let best = split_sentences(context)
                    .into_iter()
                    .map(|sentence| {
                        let lower = sentence.to_lowercase();
                        let overlap =
                            question_words.iter().filter(|w| lower.contains(w.as_str())).count();
                        (overlap, sentence)
                    })
                    .filter(|(overlap, _)| *overlap > 0)
                    .max_by_key(|(overlap, _)| *overlap)
                    .map(|(_, sentence)| sentence);

                Ok(best)
            }
        }
    }
}

/// A deterministic [`GenerativeModel`] for tests and demos.
///
/// Echoes the prompt followed by an `Answer:` marker and the canned reply,
/// imitating a completion model that repeats its input.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    reply: Option<String>,
    fail: bool,
}

impl MockGenerator {
    /// Create a generator that completes with the given reply text.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()), fail: false }
    }

    /// Create a generator that completes with empty text, driving the router
    /// to its not-found message.
    pub fn empty() -> Self {
        Self { reply: None, fail: false }
    }

    /// Create a generator whose every call fails.
    pub fn failing() -> Self {
        Self { reply: None, fail: true }
    }
}

#[async_trait]
impl GenerativeModel for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.fail {
            return Err(QaError::Model {
                model: "MockGenerator".into(),
                message: "injected failure".into(),
            });
        }
        let reply = self.reply.as_deref().unwrap_or("");
        Ok(format!("{prompt}\nAnswer: {reply}"))
    }
}
