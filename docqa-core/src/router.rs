//! Answer routing: classify a question, pick a strategy, always produce an
//! answer.
//!
//! The router runs a single pass per question. Factual questions go to the
//! extractive model first (with deterministic regex matchers taking
//! precedence for phone numbers and email addresses, where span-extraction
//! models are unreliable); conceptual questions — and factual questions whose
//! extraction came back empty — go to the generative model. Model failures
//! are recovered locally: the caller always receives an answer string, even
//! if it is an explicit not-found message.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, warn};

use crate::classifier::{QuestionClassifier, QuestionKind};
use crate::config::PipelineConfig;
use crate::document::{AnswerRecord, QaPath, ScoredPassage};
use crate::qa::{ExtractiveModel, GenerativeModel};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s\-]{7,}\d").expect("phone pattern is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email pattern is valid")
});

/// Routes questions to the extractive or generative strategy and assembles
/// the final [`AnswerRecord`].
pub struct AnswerRouter {
    classifier: Arc<dyn QuestionClassifier>,
    extractive: Arc<dyn ExtractiveModel>,
    generative: Arc<dyn GenerativeModel>,
    config: Arc<PipelineConfig>,
}

impl AnswerRouter {
    /// Create a router from its strategy components.
    pub fn new(
        classifier: Arc<dyn QuestionClassifier>,
        extractive: Arc<dyn ExtractiveModel>,
        generative: Arc<dyn GenerativeModel>,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self { classifier, extractive, generative, config }
    }

    /// Answer a question over the retrieved passages.
    ///
    /// Never fails: model errors degrade to the next strategy and end at the
    /// configured not-found message.
    pub async fn answer(&self, question: &str, retrieved: &[ScoredPassage]) -> AnswerRecord {
        if retrieved.is_empty() {
            return AnswerRecord {
                answer: self.config.not_found_message.clone(),
                evidence: Vec::new(),
                path: QaPath::None,
            };
        }

        let used: Vec<String> = retrieved
            .iter()
            .take(self.config.context_passages)
            .map(|s| s.passage.text.clone())
            .collect();
        let context = assemble_context(&used, self.config.context_budget);

        let kind = self.classifier.classify(question);
        debug!(?kind, "classified question");

        if kind == QuestionKind::Factual {
            let q = question.to_lowercase();

            // Span-extraction models are unreliable for phone numbers and
            // email addresses; a regex match over the context wins outright.
            if q.contains("phone") || q.contains("number") {
                if let Some(m) = PHONE_RE.find(&context) {
                    return self.record(m.as_str().to_string(), used, QaPath::Regex);
                }
            }
            if q.contains("email") {
                if let Some(m) = EMAIL_RE.find(&context) {
                    return self.record(m.as_str().to_string(), used, QaPath::Regex);
                }
            }

            match self.extractive.extract(&context, question).await {
                Ok(Some(span)) if !span.trim().is_empty() => {
                    return self.record(span.trim().to_string(), used, QaPath::Extractive);
                }
                Ok(_) => {
                    debug!("no extractive span, falling back to generation");
                }
                Err(e) => {
                    warn!(error = %e, "extractive model failed, falling back to generation");
                }
            }
        }

        let prompt = build_prompt(&context, question, &self.config.not_found_message);
        match self.generative.generate(&prompt).await {
            Ok(reply) => {
                let answer = extract_answer_text(&reply);
                if answer.len() > self.config.min_answer_len {
                    self.record(answer.to_string(), used, QaPath::Generative)
                } else {
                    self.record(self.config.not_found_message.clone(), used, QaPath::None)
                }
            }
            Err(e) => {
                warn!(error = %e, "generative model failed");
                self.record(self.config.not_found_message.clone(), used, QaPath::None)
            }
        }
    }

    fn record(&self, answer: String, evidence: Vec<String>, path: QaPath) -> AnswerRecord {
        debug!(%path, "answer produced");
        AnswerRecord { answer, evidence, path }
    }
}

/// Join passages with blank lines and truncate to the context budget on a
/// char boundary.
fn assemble_context(passages: &[String], budget: usize) -> String {
    let joined = passages.join("\n\n");
    truncate_chars(&joined, budget).to_string()
}

/// Truncate to at most `max` bytes without splitting a char.
fn truncate_chars(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Build the strict answer-from-document prompt.
///
/// The generator is instructed to answer only from the supplied context and
/// to emit the not-found sentinel when the context lacks the answer. The
/// trailing `Answer:` marker delineates where its actual answer begins.
fn build_prompt(context: &str, question: &str, not_found: &str) -> String {
    format!(
        "You are a document-based assistant.\n\
         Answer ONLY using the given document content.\n\
         If the answer is not present, say:\n\
         \"{not_found}\"\n\n\
         Document:\n{context}\n\n\
         Question:\n{question}\n\n\
         Answer:"
    )
}

/// Extract the text after the last `Answer:` marker in a completion.
///
/// Generators that echo the prompt repeat the marker; the real answer is
/// whatever follows its final occurrence.
fn extract_answer_text(reply: &str) -> &str {
    reply.rsplit("Answer:").next().unwrap_or(reply).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern_matches_common_formats() {
        assert_eq!(PHONE_RE.find("call +1 555-123-4567 now").unwrap().as_str(), "+1 555-123-4567");
        assert!(PHONE_RE.find("room 12").is_none());
    }

    #[test]
    fn email_pattern_matches_addresses() {
        assert_eq!(
            EMAIL_RE.find("write to jane.doe+qa@example.co.uk please").unwrap().as_str(),
            "jane.doe+qa@example.co.uk"
        );
    }

    #[test]
    fn answer_marker_extraction_takes_last_occurrence() {
        let reply = "Document:\n...\n\nAnswer:\nSomething echoed\n\nAnswer: forty-two";
        assert_eq!(extract_answer_text(reply), "forty-two");
        assert_eq!(extract_answer_text("no marker at all"), "no marker at all");
    }

    #[test]
    fn context_truncation_respects_char_boundaries() {
        let s = "héllo wörld";
        let t = truncate_chars(s, 2);
        assert_eq!(t, "h");
    }
}
