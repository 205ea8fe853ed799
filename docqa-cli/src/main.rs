//! Interactive document QA from the terminal: upload a document, then ask
//! questions in a read-answer loop.
//!
//! Runs against OpenAI-compatible endpoints when an API key is available,
//! or fully offline with the deterministic mock providers (`--mock`).

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docqa_core::http::{HttpEmbedder, HttpExtractor, HttpGenerator};
use docqa_core::mock::{MockEmbedder, MockExtractor, MockGenerator};
use docqa_core::{DocumentPipeline, QaPath};

/// Ask questions about a document from your terminal.
#[derive(Debug, Parser)]
#[command(name = "docqa", version, about)]
struct Args {
    /// Document to upload before the question loop starts.
    file: PathBuf,

    /// Use the offline mock providers instead of HTTP endpoints.
    #[arg(long)]
    mock: bool,

    /// Base URL of an OpenAI-compatible server (embeddings + chat).
    #[arg(long, default_value = "https://api.openai.com")]
    base_url: String,

    /// Extractive QA endpoint URL. When omitted, factual questions rely on
    /// the regex matchers and generative fallback only.
    #[arg(long)]
    qa_url: Option<String>,

    /// Show the evidence passages under each answer.
    #[arg(long)]
    evidence: bool,
}

fn build_pipeline(args: &Args) -> anyhow::Result<DocumentPipeline> {
    let builder = DocumentPipeline::builder();

    let pipeline = if args.mock {
        builder
            .embedder(Arc::new(MockEmbedder::default()))
            .extractive(Arc::new(MockExtractor::new()))
            .generative(Arc::new(MockGenerator::with_reply(
                "This is the offline mock generator; wire up an API key for real answers.",
            )))
            .build()?
    } else {
        let embedder = HttpEmbedder::from_env()?
            .with_url(format!("{}/v1/embeddings", args.base_url.trim_end_matches('/')));
        let generator = HttpGenerator::from_env()?
            .with_url(format!("{}/v1/chat/completions", args.base_url.trim_end_matches('/')));
        let extractive: Arc<dyn docqa_core::ExtractiveModel> = match &args.qa_url {
            Some(url) => Arc::new(HttpExtractor::new(url)),
            // No span model configured: let the router fall through to
            // regex matches and generation.
            None => Arc::new(MockExtractor::empty()),
        };
        builder
            .embedder(Arc::new(embedder))
            .extractive(extractive)
            .generative(Arc::new(generator))
            .build()?
    };

    Ok(pipeline)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();
    let pipeline = build_pipeline(&args)?;

    let report = pipeline
        .upload_file(&args.file)
        .await
        .with_context(|| format!("failed to index {}", args.file.display()))?;
    info!(chunk_count = report.chunk_count, chunk_size = report.chunk_size_used, "indexed");
    println!(
        "Indexed {} ({} passages, chunk size {}). Ask away — empty line or 'exit' to quit.",
        args.file.display(),
        report.chunk_count,
        report.chunk_size_used
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() || question.eq_ignore_ascii_case("exit") {
            break;
        }

        let record = pipeline.ask(question).await?;
        match record.path {
            QaPath::None => println!("{}", record.answer),
            path => println!("{}  [{path}]", record.answer),
        }
        if args.evidence {
            for (i, passage) in record.evidence.iter().enumerate() {
                let preview: String = passage.chars().take(120).collect();
                println!("  {}. {preview}", i + 1);
            }
        }
    }

    Ok(())
}
