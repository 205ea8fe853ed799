//! Adaptive document chunking.
//!
//! Splits raw document text into overlapping passages sized to the document
//! and the expected query workload. Passages respect sentence boundaries: a
//! sentence is never truncated mid-way, and consecutive passages share a
//! trailing-sentence overlap so context survives split boundaries.

use tracing::debug;

use crate::classifier::QueryComplexity;
use crate::config::PipelineConfig;
use crate::document::Passage;

/// Number of leading characters sampled when estimating sentence length.
const SENTENCE_SAMPLE_CHARS: usize = 5000;

/// Abbreviations that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig", "no",
    "al", "inc", "ltd", "dept",
];

/// Splits document text into sentence-bounded passages with adaptive sizing.
#[derive(Debug, Clone)]
pub struct AdaptiveChunker {
    min_chunk_size: usize,
    max_chunk_size: usize,
    target_chunk_size: usize,
    overlap: usize,
}

impl Default for AdaptiveChunker {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl AdaptiveChunker {
    /// Create a chunker from the pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            min_chunk_size: config.min_chunk_size,
            max_chunk_size: config.max_chunk_size,
            target_chunk_size: config.target_chunk_size,
            overlap: config.chunk_overlap,
        }
    }

    /// Derive a chunk size from document characteristics and query complexity.
    ///
    /// The base size comes from the file size bucket (small files get roomier
    /// chunks, large files get smaller ones to keep retrieval precise), then
    /// shifts with the average sentence length of a leading sample, then with
    /// the query complexity. The result is clamped to the configured bounds.
    ///
    /// This is a heuristic, not an optimizer — no feedback loop adjusts it
    /// from retrieval outcomes.
    pub fn calculate_chunk_size(
        &self,
        text: &str,
        file_size: Option<u64>,
        complexity: QueryComplexity,
    ) -> usize {
        let base = match file_size {
            Some(n) if n < 100_000 => 200.0,
            Some(n) if n < 1_000_000 => 300.0,
            Some(_) => 150.0,
            None => self.target_chunk_size as f64,
        };

        let sample = leading_chars(text, SENTENCE_SAMPLE_CHARS);
        let sentences = split_sentences(sample);
        let total_len: usize = sentences.iter().map(|s| s.len()).sum();
        let avg_sentence_len = total_len as f64 / sentences.len().max(1) as f64;

        let mut size = if avg_sentence_len > 150.0 {
            base * 0.7
        } else if avg_sentence_len < 50.0 {
            base * 1.3
        } else {
            base
        };

        size *= match complexity {
            QueryComplexity::Simple => 1.2,
            QueryComplexity::Medium => 1.0,
            QueryComplexity::Complex => 0.8,
        };

        let clamped = size.clamp(self.min_chunk_size as f64, self.max_chunk_size as f64) as usize;
        debug!(chunk_size = clamped, avg_sentence_len, ?complexity, "calculated chunk size");
        clamped
    }

    /// Split text into passages of roughly `chunk_size` characters.
    ///
    /// Whitespace is normalized, the text is split into sentences, and
    /// sentences are greedily accumulated until adding the next one would
    /// exceed `chunk_size`. Each new passage is seeded with trailing
    /// sentences of the previous one, taken from the end backwards while
    /// they fit in the overlap budget.
    ///
    /// A single sentence longer than `chunk_size` still gets its own passage.
    /// Empty or whitespace-only input yields zero passages.
    pub fn chunk(&self, text: &str, chunk_size: usize) -> Vec<Passage> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Vec::new();
        }

        let sentences = split_sentences(&text);
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if !current.is_empty() && current.len() + sentence.len() > chunk_size {
                let overlap = self.overlap_tail(&current);
                chunks.push(current);
                current = if overlap.is_empty() {
                    sentence
                } else {
                    format!("{} {sentence}", overlap.join(" "))
                };
            } else if current.is_empty() {
                current = sentence;
            } else {
                current.push(' ');
                current.push_str(&sentence);
            }
        }

        if !current.trim().is_empty() {
            chunks.push(current);
        }

        debug!(chunk_count = chunks.len(), chunk_size, "chunked document");

        chunks
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Passage { text, ordinal })
            .collect()
    }

    /// Collect trailing sentences of a closed passage for the next passage's
    /// overlap seed.
    ///
    /// Sentences are taken from the last backwards while the accumulated
    /// length (counting joining spaces) stays within the overlap budget. A
    /// sentence that does not fit is excluded entirely — there is no
    /// partial-sentence overlap.
    fn overlap_tail(&self, chunk: &str) -> Vec<String> {
        let sentences = split_sentences(chunk);
        let mut tail: Vec<String> = Vec::new();
        let mut used = 0usize;

        for sentence in sentences.into_iter().rev() {
            if used + sentence.len() > self.overlap {
                break;
            }
            used += sentence.len() + 1;
            tail.insert(0, sentence);
        }

        tail
    }
}

/// Collapse all whitespace runs to single spaces and trim the ends.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Take at most `n` leading characters of `text`, on a char boundary.
fn leading_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split text into sentences on `.`, `!`, and `?` boundaries.
///
/// A terminator only ends a sentence when followed by whitespace (or the end
/// of input), so decimals like `3.14` survive. Trailing quotes and closing
/// brackets stay attached to their sentence, and a short list of common
/// abbreviations does not terminate one.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((idx, c)) = iter.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        // Pull any run of closing punctuation into the sentence.
        let mut end = idx + c.len_utf8();
        while let Some(&(j, q)) = iter.peek() {
            if matches!(q, '.' | '!' | '?' | '"' | '\'' | ')' | ']') {
                end = j + q.len_utf8();
                iter.next();
            } else {
                break;
            }
        }

        let at_boundary = match iter.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if !at_boundary {
            continue;
        }
        if c == '.' && ends_with_abbreviation(&text[start..end]) {
            continue;
        }

        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = end;
    }

    let tail = text[start.min(text.len())..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Whether the fragment ends in an abbreviation (or a single initial) whose
/// period should not terminate the sentence.
fn ends_with_abbreviation(fragment: &str) -> bool {
    let trimmed = fragment.trim_end();
    let Some(stripped) = trimmed.strip_suffix('.') else {
        return false;
    };
    let last_word = stripped
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| c.is_ascii_punctuation() && c != '.');

    if last_word.is_empty() {
        return false;
    }
    // Single-letter initials: "J. Smith".
    if last_word.len() == 1 && last_word.chars().all(|c| c.is_alphabetic()) {
        return true;
    }
    let lower = last_word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminators_followed_by_space() {
        let sentences = split_sentences("First one. Second one! Third one? Fourth");
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third one?", "Fourth"]);
    }

    #[test]
    fn keeps_decimals_and_abbreviations_intact() {
        let sentences = split_sentences("Pi is roughly 3.14 according to Dr. Jones. Next.");
        assert_eq!(sentences, vec!["Pi is roughly 3.14 according to Dr. Jones.", "Next."]);
    }

    #[test]
    fn keeps_closing_quotes_attached() {
        let sentences = split_sentences("He said \"stop.\" Then he left.");
        assert_eq!(sentences, vec!["He said \"stop.\"", "Then he left."]);
    }

    #[test]
    fn normalizes_whitespace_runs() {
        assert_eq!(normalize_whitespace("  a\t b\n\nc  "), "a b c");
    }

    #[test]
    fn empty_input_yields_no_passages() {
        let chunker = AdaptiveChunker::default();
        assert!(chunker.chunk("", 300).is_empty());
        assert!(chunker.chunk(" \n\t ", 300).is_empty());
    }

    #[test]
    fn oversized_sentence_gets_its_own_passage() {
        let chunker = AdaptiveChunker::default();
        let long = format!("{} end.", "word ".repeat(100));
        let passages = chunker.chunk(&format!("Short lead. {long} Short tail."), 50);
        assert!(passages.iter().any(|p| p.text.contains("word word")));
        // The long sentence is never truncated mid-way.
        let long_passage = passages.iter().find(|p| p.len() > 400).unwrap();
        assert!(long_passage.text.ends_with("end."));
    }

    #[test]
    fn ordinals_follow_build_order() {
        let chunker = AdaptiveChunker::default();
        let text = "One sentence here. Another sentence here. Third sentence here. \
                    Fourth sentence here. Fifth sentence here."
            .to_string();
        let passages = chunker.chunk(&text, 60);
        for (i, p) in passages.iter().enumerate() {
            assert_eq!(p.ordinal, i);
        }
    }

    #[test]
    fn overlap_excludes_sentences_larger_than_budget() {
        // Every sentence is longer than the 50-char overlap budget, so no
        // overlap seed is carried — passages must not share prefixes.
        let chunker = AdaptiveChunker::default();
        let s1 = "This opening sentence is clearly longer than fifty characters in total.";
        let s2 = "This second sentence is also much longer than fifty characters overall.";
        let passages = chunker.chunk(&format!("{s1} {s2}"), 80);
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].text, s1);
        assert_eq!(passages[1].text, s2);
    }

    #[test]
    fn overlap_repeats_trailing_sentences() {
        let chunker = AdaptiveChunker::default();
        let text = "Alpha is first. Beta is second. Gamma is third. Delta is fourth. \
                    Epsilon is fifth. Zeta is sixth.";
        let passages = chunker.chunk(text, 60);
        assert!(passages.len() > 1);
        for pair in passages.windows(2) {
            // The next passage begins with a non-empty suffix of the
            // previous one.
            let prev = &pair[0].text;
            let shared = (1..=prev.len()).rev().any(|k| pair[1].text.starts_with(&prev[prev.len() - k..]));
            assert!(shared, "no overlap between {prev:?} and {:?}", pair[1].text);
        }
    }

    #[test]
    fn size_buckets_drive_base_size() {
        let chunker = AdaptiveChunker::default();
        // Medium-length sentences so no sentence-length adjustment kicks in.
        let text = "This sentence sits comfortably in the middle of the length range here. "
            .repeat(20);
        let small = chunker.calculate_chunk_size(&text, Some(10_000), QueryComplexity::Medium);
        let medium = chunker.calculate_chunk_size(&text, Some(500_000), QueryComplexity::Medium);
        let large = chunker.calculate_chunk_size(&text, Some(5_000_000), QueryComplexity::Medium);
        assert_eq!(small, 200);
        assert_eq!(medium, 300);
        assert_eq!(large, 150);
    }

    #[test]
    fn complexity_scales_chunk_size() {
        let chunker = AdaptiveChunker::default();
        let text = "This sentence sits comfortably in the middle of the length range here. "
            .repeat(20);
        let simple = chunker.calculate_chunk_size(&text, Some(500_000), QueryComplexity::Simple);
        let complex = chunker.calculate_chunk_size(&text, Some(500_000), QueryComplexity::Complex);
        assert_eq!(simple, 360);
        assert_eq!(complex, 240);
    }

    #[test]
    fn short_sentences_grow_the_target() {
        let chunker = AdaptiveChunker::default();
        let text = "Short one. Tiny two. Wee three. ".repeat(50);
        let size = chunker.calculate_chunk_size(&text, Some(500_000), QueryComplexity::Medium);
        assert_eq!(size, 390);
    }

    #[test]
    fn result_is_clamped_to_bounds() {
        let chunker = AdaptiveChunker::default();
        // Large file (base 150) with long sentences (x0.7) and a complex
        // query (x0.8) lands below the minimum and clamps to it.
        let long = format!("{}.", "x".repeat(200));
        let text = format!("{long} {long} {long}");
        let size = chunker.calculate_chunk_size(&text, Some(5_000_000), QueryComplexity::Complex);
        assert_eq!(size, 100);
    }
}
