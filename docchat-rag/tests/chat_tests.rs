//! End-to-end document chat with offline components.

mod common;

use std::sync::Arc;

use common::{FailingEmbedder, KeywordEmbedder};
use docchat_model::MockGenerator;
use docchat_rag::{
    Answerer, ChatSession, DocumentChat, InMemoryVectorStore, NO_CONTEXT_MARKER, PageText,
    PlainTextExtractor, RagConfig, RagError, Role,
};

fn config() -> RagConfig {
    RagConfig::builder()
        .window_size(60)
        .stride(50)
        .min_chunk_chars(10)
        .top_k(2)
        .document_type("medical_report")
        .build()
        .unwrap()
}

fn chat(generator: Arc<MockGenerator>) -> DocumentChat {
    DocumentChat::builder()
        .config(config())
        .embedding_provider(Arc::new(KeywordEmbedder::new()))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .generator(generator)
        .extractor(Arc::new(PlainTextExtractor))
        .build()
        .unwrap()
}

const REPORT: &[u8] = b"Patient history: blood pressure 150/95 on repeat visits.\x0c\
Diagnosis: hypertension, stage one. Medication dose reviewed.";

#[tokio::test]
async fn answer_with_empty_context_still_calls_generator() {
    let generator = Arc::new(MockGenerator::new("The document does not say."));
    let answerer = Answerer::new(generator.clone());

    let answer = answerer.answer("X?", &[]).await.unwrap();

    assert_eq!(answer, "The document does not say.");
    assert_eq!(generator.calls(), 1);
    assert!(generator.last_prompt().unwrap().contains(NO_CONTEXT_MARKER));
}

#[tokio::test]
async fn generator_failure_is_a_generation_error() {
    let answerer = Answerer::new(Arc::new(MockGenerator::failing("rate limited")));
    let err = answerer.answer("X?", &[]).await.unwrap_err();
    assert!(matches!(err, RagError::GenerationError { .. }));
}

#[tokio::test]
async fn asking_before_indexing_is_recoverable() {
    let chat = chat(Arc::new(MockGenerator::new("unused")));
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    let err = chat.ask(&mut session, "What is the diagnosis?").await.unwrap_err();

    assert!(err.is_recoverable());
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].role, Role::User);
}

#[tokio::test]
async fn index_then_ask_propagates_pages() {
    let generator = Arc::new(MockGenerator::new("Hypertension (page 2)."));
    let chat = chat(generator.clone());
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    let report = chat.index_document(&mut session, "report.pdf", REPORT).await.unwrap();
    assert_eq!(report.page_count, 2);
    assert!(report.chunk_count >= 2);
    assert!(report.degraded.is_empty());
    assert!(session.is_ready());
    assert_eq!(session.source(), Some("report.pdf"));

    let turn = chat.ask(&mut session, "What is the diagnosis?").await.unwrap();

    assert_eq!(turn.answer, "Hypertension (page 2).");
    assert!(turn.sources.len() <= 2);
    assert_eq!(turn.sources[0].page, 2);
    assert!(turn.sources[0].excerpt.contains("hypertension"));
    assert!(generator.last_prompt().unwrap().contains("[source: report.pdf, page 2]"));

    let log = session.messages();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].role, Role::Assistant);
    assert_eq!(log[1].sources, turn.sources);
}

#[tokio::test]
async fn pages_without_text_do_not_switch_document() {
    let chat = chat(Arc::new(MockGenerator::new("ok")));
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    chat.index_document(&mut session, "report.pdf", REPORT).await.unwrap();
    let report = chat
        .index_pages(&mut session, "scan.pdf", &[PageText::new(1, ""), PageText::new(2, "  ")])
        .await
        .unwrap();

    assert_eq!(report.chunk_count, 0);
    assert_eq!(report.page_count, 2);
    assert_eq!(session.source(), Some("report.pdf"));
}

#[tokio::test]
async fn emptied_active_document_resets_session() {
    let chat = chat(Arc::new(MockGenerator::new("ok")));
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    chat.index_document(&mut session, "report.pdf", REPORT).await.unwrap();
    chat.index_pages(&mut session, "other.pdf", &[PageText::new(1, "Allergy history noted for penicillin")])
        .await
        .unwrap();
    assert_eq!(session.source(), Some("other.pdf"));

    let report = chat.index_pages(&mut session, "other.pdf", &[PageText::new(1, "")]).await.unwrap();

    assert_eq!(report.chunk_count, 0);
    assert!(!session.is_ready());
    assert_eq!(session.source(), None);
}

#[tokio::test]
async fn session_counts_pages_that_produced_chunks() {
    let chat = chat(Arc::new(MockGenerator::new("ok")));
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    let pages = [
        PageText::new(1, "Patient history: blood pressure 150/95 on repeat visits."),
        PageText::new(2, "   "),
    ];
    let report = chat.index_pages(&mut session, "report.pdf", &pages).await.unwrap();

    assert_eq!(report.page_count, 2);
    assert_eq!(session.document().unwrap().page_count, 1);
}

#[tokio::test]
async fn clear_history_keeps_document_ready() {
    let chat = chat(Arc::new(MockGenerator::new("ok")));
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    chat.index_document(&mut session, "report.pdf", REPORT).await.unwrap();
    chat.ask(&mut session, "diagnosis?").await.unwrap();
    session.clear_history();

    assert!(session.messages().is_empty());
    assert!(session.is_ready());
}

#[tokio::test]
async fn embedding_outage_keeps_question_in_log() {
    let chat = DocumentChat::builder()
        .config(config())
        .embedding_provider(Arc::new(FailingEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .generator(Arc::new(MockGenerator::new("unused")))
        .build()
        .unwrap();
    chat.open_collection().await.unwrap();
    let mut session = ChatSession::new();

    let err = chat
        .index_pages(&mut session, "a.pdf", &[PageText::new(1, "Patient blood pressure history")])
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::EmbeddingError { .. }));
    assert!(!session.is_ready());
}

#[test]
fn builder_requires_components() {
    let err = DocumentChat::builder().config(config()).build().err().unwrap();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[tokio::test]
async fn blank_question_is_not_logged() {
    let chat = chat(Arc::new(MockGenerator::new("ok")));
    let mut session = ChatSession::new();
    assert!(matches!(chat.ask(&mut session, "  ").await, Err(RagError::InvalidArgument(_))));
    assert!(session.messages().is_empty());
}
