//! Question classification: factual vs. conceptual routing and query
//! complexity analysis.
//!
//! Both classifiers are deliberately cheap and deterministic — surface
//! pattern checks, not learned models. The routing classifier sits behind
//! the [`QuestionClassifier`] trait so it can be swapped for a learned model
//! without touching the router.

use serde::{Deserialize, Serialize};

/// How a question should be routed by the answer router.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Short factual lookup — route to the extractive model first.
    Factual,
    /// Open-ended or analytical — route straight to the generative model.
    Conceptual,
}

/// Heuristic complexity of a question, used to tune chunk sizing.
///
/// Derived fresh per question from surface patterns; never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryComplexity {
    /// Factual, short — larger chunks give cheap extra context.
    Simple,
    /// Neither obviously simple nor analytical.
    Medium,
    /// Analytical or multi-part — smaller chunks improve retrieval precision.
    Complex,
}

/// Phrases that mark a question as analytical.
const COMPLEX_PATTERNS: &[&str] =
    &["explain", "analyze", "compare", "summarize", "how does", "why does"];

/// Phrases that mark a question as a short factual lookup.
const SIMPLE_PATTERNS: &[&str] =
    &["what is", "who is", "when was", "where is", "phone", "email", "date"];

impl QueryComplexity {
    /// Classify a question by keyword presence and token count.
    pub fn of(question: &str) -> Self {
        let q = question.to_lowercase();

        if COMPLEX_PATTERNS.iter().any(|p| q.contains(p)) {
            return QueryComplexity::Complex;
        }
        let word_count = q.split_whitespace().count();
        if word_count <= 4 || SIMPLE_PATTERNS.iter().any(|p| q.contains(p)) {
            return QueryComplexity::Simple;
        }
        QueryComplexity::Medium
    }
}

/// A classifier deciding whether a question is factual or conceptual.
///
/// Implementations must be cheap enough to run on every question.
pub trait QuestionClassifier: Send + Sync {
    /// Classify a question for answer routing.
    fn classify(&self, question: &str) -> QuestionKind;
}

/// Keywords whose presence marks a question as factual.
const FACTUAL_KEYWORDS: &[&str] =
    &["name", "email", "phone", "number", "date", "degree", "college", "skill", "contact"];

/// The default [`QuestionClassifier`]: a lower-cased substring membership
/// test over a fixed factual-keyword set.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self { keywords: FACTUAL_KEYWORDS.iter().map(|k| k.to_string()).collect() }
    }
}

impl KeywordClassifier {
    /// Create a classifier with the default factual keyword set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with a custom factual keyword set.
    ///
    /// Keywords are matched case-insensitively as substrings.
    pub fn with_keywords(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { keywords: keywords.into_iter().map(|k| k.into().to_lowercase()).collect() }
    }
}

impl QuestionClassifier for KeywordClassifier {
    fn classify(&self, question: &str) -> QuestionKind {
        let q = question.to_lowercase();
        if self.keywords.iter().any(|k| q.contains(k.as_str())) {
            QuestionKind::Factual
        } else {
            QuestionKind::Conceptual
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factual_keywords_route_factual() {
        let classifier = KeywordClassifier::new();
        assert_eq!(classifier.classify("What is the phone number?"), QuestionKind::Factual);
        assert_eq!(classifier.classify("Which COLLEGE did she attend?"), QuestionKind::Factual);
    }

    #[test]
    fn other_questions_route_conceptual() {
        let classifier = KeywordClassifier::new();
        assert_eq!(classifier.classify("Summarize the chapter"), QuestionKind::Conceptual);
        assert_eq!(classifier.classify("How does the engine work?"), QuestionKind::Conceptual);
    }

    #[test]
    fn custom_keywords_override_defaults() {
        let classifier = KeywordClassifier::with_keywords(["invoice"]);
        assert_eq!(classifier.classify("What is the invoice total?"), QuestionKind::Factual);
        assert_eq!(classifier.classify("What is the phone number?"), QuestionKind::Conceptual);
    }

    #[test]
    fn analytical_patterns_are_complex() {
        assert_eq!(QueryComplexity::of("Explain the cooling system"), QueryComplexity::Complex);
        assert_eq!(QueryComplexity::of("why does the pump stall?"), QueryComplexity::Complex);
    }

    #[test]
    fn short_or_factual_patterns_are_simple() {
        assert_eq!(QueryComplexity::of("What is the email address?"), QueryComplexity::Simple);
        assert_eq!(QueryComplexity::of("Main author?"), QueryComplexity::Simple);
    }

    #[test]
    fn everything_else_is_medium() {
        assert_eq!(
            QueryComplexity::of("List the maintenance steps performed in March"),
            QueryComplexity::Medium
        );
    }
}
