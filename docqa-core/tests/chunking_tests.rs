//! Property tests for adaptive chunking: coverage, bounds, and overlap.

use docqa_core::chunking::AdaptiveChunker;
use docqa_core::document::Passage;
use proptest::prelude::*;

/// Generate a document as unique short sentences separated by single spaces.
///
/// Sentence uniqueness keeps overlap reconstruction unambiguous: any passage
/// prefix that matches a suffix of the previous passage is the real overlap
/// seed, not an accidental repeat.
fn arb_document() -> impl Strategy<Value = String> {
    proptest::collection::vec(proptest::collection::vec("[a-z]{2,10}", 2..10), 1..25).prop_map(
        |sentences| {
            sentences
                .into_iter()
                .enumerate()
                .map(|(i, words)| format!("s{i} {}.", words.join(" ")))
                .collect::<Vec<_>>()
                .join(" ")
        },
    )
}

/// Rebuild the source text from passages by stripping each passage's overlap
/// seed (the longest prefix that is a suffix of the text rebuilt so far).
fn reconstruct(passages: &[Passage]) -> String {
    let mut acc = String::new();
    for p in passages {
        if acc.is_empty() {
            acc.push_str(&p.text);
            continue;
        }
        let k = (0..=p.text.len())
            .rev()
            .find(|&k| p.text.is_char_boundary(k) && acc.ends_with(&p.text[..k]))
            .unwrap_or(0);
        let rest = p.text[k..].trim_start();
        if rest.is_empty() {
            continue;
        }
        acc.push(' ');
        acc.push_str(rest);
    }
    acc
}

/// Length of the last sentence of a passage, counting its leading space.
fn last_sentence_len(passage: &str) -> usize {
    let trimmed = passage.strip_suffix('.').unwrap_or(passage);
    match trimmed.rfind('.') {
        Some(pos) => passage.len() - pos - 1,
        None => passage.len(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Concatenating all passages (ignoring overlap regions) reproduces the
    /// source text: no sentence dropped, none split mid-way.
    #[test]
    fn passages_cover_the_source_text(
        text in arb_document(),
        chunk_size in 40usize..400,
    ) {
        let chunker = AdaptiveChunker::default();
        let passages = chunker.chunk(&text, chunk_size);
        prop_assert!(!passages.is_empty());
        prop_assert_eq!(reconstruct(&passages), text);
    }

    /// Every closed passage stays within the target size plus the overlap
    /// seed and one sentence — the greedy loop never grows a passage past
    /// the point where the next sentence would not fit.
    #[test]
    fn closed_passages_respect_the_size_bound(
        text in arb_document(),
        chunk_size in 40usize..400,
    ) {
        let chunker = AdaptiveChunker::default();
        let longest_sentence = text
            .split_inclusive('.')
            .map(|s| s.trim().len())
            .max()
            .unwrap_or(0);
        let passages = chunker.chunk(&text, chunk_size);
        for p in &passages[..passages.len().saturating_sub(1)] {
            // Overlap budget (50) + joining space + one sentence is the
            // worst-case seed; a closed passage never exceeds the target by
            // more than that seed (plus the joining spaces the greedy
            // accumulation does not count).
            prop_assert!(
                p.len() <= (chunk_size + 1).max(51 + longest_sentence),
                "passage of {} chars exceeds bound for target {}",
                p.len(),
                chunk_size,
            );
        }
    }

    /// Ordinals are assigned in build order, and chunking the same text with
    /// the same parameters is deterministic.
    #[test]
    fn chunking_is_deterministic_with_sequential_ordinals(
        text in arb_document(),
        chunk_size in 40usize..400,
    ) {
        let chunker = AdaptiveChunker::default();
        let first = chunker.chunk(&text, chunk_size);
        let second = chunker.chunk(&text, chunk_size);
        prop_assert_eq!(&first, &second);
        for (i, p) in first.iter().enumerate() {
            prop_assert_eq!(p.ordinal, i);
        }
    }

    /// When a document splits into multiple passages, each follower begins
    /// with a non-empty suffix of its predecessor whenever the predecessor's
    /// final sentence fits the overlap budget.
    #[test]
    fn followers_share_an_overlap_prefix(
        text in arb_document(),
        chunk_size in 60usize..200,
    ) {
        let chunker = AdaptiveChunker::default();
        let passages = chunker.chunk(&text, chunk_size);
        for pair in passages.windows(2) {
            let prev = &pair[0].text;
            if last_sentence_len(prev) > 50 {
                // The trailing sentence exceeds the overlap budget and is
                // excluded entirely; no overlap is promised.
                continue;
            }
            let shared = (1..=prev.len())
                .rev()
                .any(|k| prev.is_char_boundary(k) && pair[1].text.starts_with(&prev[prev.len() - k..]));
            prop_assert!(shared, "no overlap between {:?} and {:?}", prev, &pair[1].text);
        }
    }
}
