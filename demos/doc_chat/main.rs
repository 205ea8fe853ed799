//! # Document Chat Demo
//!
//! Demonstrates the full document QA flow: upload a document, then answer a
//! mix of factual and conceptual questions.
//!
//! Uses the deterministic mock providers so it runs with **zero API keys** —
//! the regex and extractive paths give real answers, the generative path
//! replays a canned completion.
//!
//! Run: `cargo run --bin doc_chat`

use std::sync::Arc;

use docqa_core::DocumentPipeline;
use docqa_core::mock::{MockEmbedder, MockExtractor, MockGenerator};

const DOCUMENT: &str = "\
    Orion Conference Centre Handbook. The centre is open from 8am to 10pm on \
    weekdays. Room bookings are handled by the front desk team. You can reach \
    the front desk at +44 20 7946 0958 or at bookings@orioncentre.example. \
    The main hall seats four hundred guests and has a built-in stage. Catering \
    must be arranged at least five working days in advance. Lost property is \
    kept for one month before donation.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -- 1. Build a pipeline with offline components ----------------------
    // MockEmbedder hashes text into 64-dimensional normalized vectors.
    // MockExtractor picks the context sentence with the most word overlap.
    // MockGenerator stands in for a real completion model.
    let pipeline = DocumentPipeline::builder()
        .embedder(Arc::new(MockEmbedder::default()))
        .extractive(Arc::new(MockExtractor::new()))
        .generative(Arc::new(MockGenerator::with_reply(
            "The handbook covers opening hours, bookings, catering, and lost property.",
        )))
        .build()?;

    // -- 2. Upload the document -------------------------------------------
    let report = pipeline.upload(DOCUMENT, None).await?;
    println!("Indexed {} passages (chunk size {}).\n", report.chunk_count, report.chunk_size_used);

    // -- 3. Ask a mix of factual and conceptual questions ------------------
    let questions = [
        "What is the phone number of the front desk?",
        "What is the booking email?",
        "How many guests does the main hall seat?",
        "Summarize the handbook",
        "What is the wifi password?",
    ];

    for question in questions {
        let record = pipeline.ask(question).await?;
        println!("Q: {question}");
        println!("A: {}  [{}]", record.answer, record.path);
        if let Some(evidence) = record.evidence.first() {
            let preview: String = evidence.chars().take(80).collect();
            println!("   evidence: {preview}...");
        }
        println!();
    }

    Ok(())
}
