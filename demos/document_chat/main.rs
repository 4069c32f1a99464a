//! # Document Chat Example
//!
//! Indexes a two-page report and asks questions about it, fully offline:
//! `HashingEmbedder` stands in for an embedding model and `MockGenerator`
//! echoes a canned answer, so the interesting output is the retrieved
//! sources and the prompt that would be sent to a real model.
//!
//! Pass a path to index your own text file (pages separated by form feeds):
//!
//! Run: `cargo run -p docchat-demos --example document_chat [-- report.txt]`

use std::sync::Arc;

use docchat_demos::HashingEmbedder;
use docchat_model::MockGenerator;
use docchat_rag::{ChatSession, DocumentChat, LocalVectorStore, PlainTextExtractor, RagConfig};

const SAMPLE_REPORT: &str = "\
Patient: J. Doe, 54. Presented with recurring headaches and dizziness over \
three weeks. Blood pressure measured at 152/96 and 149/94 on separate visits. \
Heart rate 78 bpm. No known drug allergies. Family history of cardiovascular \
disease.\x0c\
Assessment: findings are consistent with stage 1 hypertension. Diagnosis: \
essential hypertension. Plan: start lisinopril 10 mg daily, reduce sodium \
intake, follow-up blood pressure check in four weeks. Recommended home \
monitoring twice daily.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    docchat_telemetry::init_telemetry("docchat-demo")?;

    let (source, bytes) = match std::env::args().nth(1) {
        Some(path) => (path.clone(), std::fs::read(&path)?),
        None => ("sample_report.txt".to_string(), SAMPLE_REPORT.as_bytes().to_vec()),
    };

    // -- 1. Configure -----------------------------------------------------
    let config = RagConfig::builder().document_type("medical_report").top_k(3).build()?;

    // -- 2. Assemble offline components -----------------------------------
    // The index directory is reused between runs; re-indexing the same
    // source replaces its previous chunks.
    let index_dir = std::env::temp_dir().join("docchat_demo_index");
    let generator = Arc::new(MockGenerator::new(
        "(offline demo) A real model would answer from the context above.",
    ));
    let chat = DocumentChat::builder()
        .config(config)
        .embedding_provider(Arc::new(HashingEmbedder::new(256)))
        .vector_store(Arc::new(LocalVectorStore::open(&index_dir).await?))
        .generator(generator.clone())
        .extractor(Arc::new(PlainTextExtractor::new()))
        .build()?;
    chat.open_collection().await?;

    // -- 3. Index ---------------------------------------------------------
    let mut session = ChatSession::new();
    let report = chat.index_document(&mut session, &source, &bytes).await?;
    println!(
        "Indexed {}: {} chunks from {} pages ({})",
        report.source,
        report.chunk_count,
        report.page_count,
        index_dir.display()
    );
    for notice in &report.degraded {
        println!("  degraded: {notice}");
    }

    // -- 4. Ask -----------------------------------------------------------
    for question in ["What is the diagnosis?", "What medication was prescribed?"] {
        match chat.ask(&mut session, question).await {
            Ok(turn) => {
                println!("\nQ: {}\nA: {}", turn.question, turn.answer);
                for source in &turn.sources {
                    println!("  [{} p.{} score {:.3}] {}", source.source, source.page, source.score, source.excerpt);
                }
            }
            Err(e) if e.is_recoverable() => println!("\nQ: {question}\n  nothing indexed yet"),
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(prompt) = generator.last_prompt() {
        println!("\n--- last prompt ---\n{prompt}");
    }
    println!("\n{} messages in session {}", session.messages().len(), session.id());
    Ok(())
}
