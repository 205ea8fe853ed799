//! End-to-end pipeline tests: upload, routing, fallbacks, and replacement.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use docqa_core::document::QaPath;
use docqa_core::embedding::EmbeddingProvider;
use docqa_core::error::{QaError, Result};
use docqa_core::mock::{MockEmbedder, MockExtractor, MockGenerator};
use docqa_core::pipeline::DocumentPipeline;

fn pipeline(extractor: MockExtractor, generator: MockGenerator) -> DocumentPipeline {
    DocumentPipeline::builder()
        .embedder(Arc::new(MockEmbedder::default()))
        .extractive(Arc::new(extractor))
        .generative(Arc::new(generator))
        .build()
        .unwrap()
}

#[tokio::test]
async fn asking_before_upload_reports_not_ready() {
    let p = pipeline(MockExtractor::new(), MockGenerator::with_reply("anything"));
    let record = p.ask("What is the phone number?").await.unwrap();
    assert_eq!(record.answer, "Please upload a document first.");
    assert_eq!(record.path, QaPath::None);
    assert!(record.evidence.is_empty());
}

#[tokio::test]
async fn empty_document_leaves_pipeline_not_ready() {
    let p = pipeline(MockExtractor::new(), MockGenerator::with_reply("anything"));
    let report = p.upload("   \n\t  ", None).await.unwrap();
    assert_eq!(report.chunk_count, 0);
    assert!(!p.is_ready().await);

    let record = p.ask("Anything at all?").await.unwrap();
    assert_eq!(record.path, QaPath::None);
    assert_eq!(record.answer, "Please upload a document first.");
}

#[tokio::test]
async fn upload_reports_chunk_count_and_size() {
    let p = pipeline(MockExtractor::new(), MockGenerator::with_reply("ok"));
    let text = "One short sentence here. Another short sentence follows. ".repeat(30);
    let report = p.upload(&text, Some(10_000)).await.unwrap();
    assert!(report.chunk_count > 1);
    assert!(report.chunk_size_used >= 100 && report.chunk_size_used <= 1000);
    assert_eq!(p.chunk_size_used().await, Some(report.chunk_size_used));
    assert!(p.is_ready().await);
}

#[tokio::test]
async fn phone_questions_answer_via_regex() {
    let p = pipeline(MockExtractor::empty(), MockGenerator::with_reply("should not be used"));
    p.upload("You can reach the support desk at +1 555-123-4567 at any time.", None)
        .await
        .unwrap();

    let record = p.ask("What is the phone number?").await.unwrap();
    assert_eq!(record.answer, "+1 555-123-4567");
    assert_eq!(record.path, QaPath::Regex);
    assert!(!record.evidence.is_empty());
}

#[tokio::test]
async fn email_questions_answer_via_regex() {
    let p = pipeline(MockExtractor::empty(), MockGenerator::with_reply("should not be used"));
    p.upload("Contact the office at front.desk@example.com for bookings.", None).await.unwrap();

    let record = p.ask("What is the contact email?").await.unwrap();
    assert_eq!(record.answer, "front.desk@example.com");
    assert_eq!(record.path, QaPath::Regex);
}

#[tokio::test]
async fn factual_questions_use_the_extractive_span() {
    let p = pipeline(
        MockExtractor::with_span("Bachelor of Science"),
        MockGenerator::with_reply("should not be used"),
    );
    p.upload("She holds a Bachelor of Science degree from the state college.", None)
        .await
        .unwrap();

    let record = p.ask("What degree does she hold?").await.unwrap();
    assert_eq!(record.answer, "Bachelor of Science");
    assert_eq!(record.path, QaPath::Extractive);
}

#[tokio::test]
async fn conceptual_questions_route_to_generation() {
    let p = pipeline(
        MockExtractor::with_span("should not be used"),
        MockGenerator::with_reply("The chapter walks through the annual maintenance schedule."),
    );
    p.upload("The chapter covers the maintenance schedule in detail.", None).await.unwrap();

    let record = p.ask("Summarize the chapter").await.unwrap();
    assert_eq!(record.answer, "The chapter walks through the annual maintenance schedule.");
    assert_eq!(record.path, QaPath::Generative);
}

#[tokio::test]
async fn failed_extraction_falls_back_to_generation() {
    let p = pipeline(
        MockExtractor::failing(),
        MockGenerator::with_reply("The listed degree is a Bachelor of Science."),
    );
    p.upload("She holds a Bachelor of Science degree from the state college.", None)
        .await
        .unwrap();

    let record = p.ask("What degree does she hold?").await.unwrap();
    assert_eq!(record.path, QaPath::Generative);
    assert_eq!(record.answer, "The listed degree is a Bachelor of Science.");
}

#[tokio::test]
async fn empty_generation_becomes_not_found() {
    let p = pipeline(MockExtractor::empty(), MockGenerator::empty());
    p.upload("The sky is blue.", None).await.unwrap();

    let record = p.ask("What is 2+2?").await.unwrap();
    assert_eq!(record.answer, "The document does not contain this information.");
    assert_eq!(record.path, QaPath::None);
}

#[tokio::test]
async fn generation_failure_becomes_not_found() {
    let p = pipeline(MockExtractor::empty(), MockGenerator::failing());
    p.upload("The sky is blue.", None).await.unwrap();

    let record = p.ask("Explain the colour of the sky").await.unwrap();
    assert_eq!(record.answer, "The document does not contain this information.");
    assert_eq!(record.path, QaPath::None);
}

#[tokio::test]
async fn reupload_fully_replaces_evidence() {
    let p = pipeline(MockExtractor::new(), MockGenerator::with_reply("ok"));

    let doc_a = "Alpha report first section. Alpha report second section. \
                 Alpha report third section.";
    let doc_b = "Bravo manual opening chapter. Bravo manual closing chapter. \
                 Bravo manual appendix notes.";
    p.upload(doc_a, None).await.unwrap();
    p.upload(doc_b, None).await.unwrap();

    for question in ["Summarize the manual", "What is in the appendix notes?"] {
        let record = p.ask(question).await.unwrap();
        for evidence in &record.evidence {
            assert!(
                doc_b.contains(evidence),
                "evidence {evidence:?} is not a passage of the second document"
            );
        }
    }
}

/// An embedder that can be switched into failure mode mid-test.
struct FlakyEmbedder {
    inner: MockEmbedder,
    fail: AtomicBool,
}

impl FlakyEmbedder {
    fn new() -> Self {
        Self { inner: MockEmbedder::default(), fail: AtomicBool::new(false) }
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(QaError::Embedding {
                provider: "Flaky".into(),
                message: "switched off".into(),
            });
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[tokio::test]
async fn failed_reupload_never_serves_stale_passages() {
    let embedder = Arc::new(FlakyEmbedder::new());
    let p = DocumentPipeline::builder()
        .embedder(Arc::clone(&embedder) as Arc<dyn EmbeddingProvider>)
        .extractive(Arc::new(MockExtractor::new()))
        .generative(Arc::new(MockGenerator::with_reply("ok")))
        .build()
        .unwrap();

    p.upload("The first document is indexed fine.", None).await.unwrap();
    assert!(p.is_ready().await);

    embedder.fail.store(true, Ordering::SeqCst);
    let err = p.upload("The second document will fail to embed.", None).await.unwrap_err();
    assert!(matches!(err, QaError::Embedding { .. }));

    // The old index was cleared: the pipeline asks for a fresh upload
    // instead of answering from the superseded document.
    embedder.fail.store(false, Ordering::SeqCst);
    let record = p.ask("What is indexed?").await.unwrap();
    assert_eq!(record.path, QaPath::None);
    assert_eq!(record.answer, "Please upload a document first.");
}

#[tokio::test]
async fn upload_file_roundtrip_and_format_rejection() {
    let p = pipeline(MockExtractor::new(), MockGenerator::with_reply("ok"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    tokio::fs::write(&path, "Meeting notes from the review. Action items follow.")
        .await
        .unwrap();

    let report = p.upload_file(&path).await.unwrap();
    assert!(report.chunk_count >= 1);
    assert!(p.is_ready().await);

    let bad = dir.path().join("slides.pptx");
    tokio::fs::write(&bad, b"not really slides").await.unwrap();
    let err = p.upload_file(&bad).await.unwrap_err();
    assert!(matches!(err, QaError::UnsupportedFormat { .. }));
}
