//! # OpenAI Document Chat Example
//!
//! Indexes a document with OpenAI embeddings and answers one question with
//! an OpenAI chat model. Any OpenAI-compatible server works through
//! `OPENAI_BASE_URL`.
//!
//! Requires `OPENAI_API_KEY`. Optional: `OPENAI_BASE_URL`, `OPENAI_MODEL`,
//! `OPENAI_EMBEDDING_MODEL`, `DOCCHAT_INDEX_DIR`.
//!
//! Run: `cargo run -p docchat-demos --example openai_chat --features openai,pdf -- report.pdf "What is the diagnosis?"`

use std::sync::Arc;

use anyhow::Context;
use docchat_model::OpenAIChatModel;
use docchat_rag::{ChatSession, DocumentChat, LocalVectorStore, OpenAIEmbeddingProvider, RagConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    docchat_telemetry::init_telemetry("docchat-openai-demo")?;

    let mut args = std::env::args().skip(1);
    let path = args.next().context("usage: openai_chat <document> [question]")?;
    let question = args.next().unwrap_or_else(|| "Summarise this document.".to_string());
    let index_dir =
        std::env::var("DOCCHAT_INDEX_DIR").unwrap_or_else(|_| "./docchat_index".to_string());

    let embedder = OpenAIEmbeddingProvider::from_env()?;
    info!(model = embedder.model(), "using OpenAI embeddings");

    let chat = DocumentChat::builder()
        .config(RagConfig::builder().collection("openai_documents").build()?)
        .embedding_provider(Arc::new(embedder))
        .vector_store(Arc::new(LocalVectorStore::open(&index_dir).await?))
        .generator(Arc::new(OpenAIChatModel::from_env()?))
        .build()?;
    chat.open_collection().await?;

    let source = std::path::Path::new(&path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path.as_str())
        .to_string();
    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;

    let mut session = ChatSession::new();
    let report = chat.index_document(&mut session, &source, &bytes).await?;
    println!("Indexed {source}: {} chunks, {} pages", report.chunk_count, report.page_count);
    if !session.is_ready() {
        println!("No text could be extracted; nothing to ask about.");
        return Ok(());
    }

    let turn = chat.ask(&mut session, &question).await?;
    println!("\n{}\n", turn.answer);
    for source in &turn.sources {
        println!("- {} page {} ({:.3})", source.source, source.page, source.score);
    }
    Ok(())
}
