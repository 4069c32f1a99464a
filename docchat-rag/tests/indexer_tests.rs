//! Indexer behaviour against the in-memory store.

mod common;

use std::sync::Arc;

use common::{FailingEmbedder, KeywordEmbedder, ShortBatchEmbedder};
use docchat_rag::{
    Chunk, ChunkMetadata, Chunker, FixedWindowChunker, InMemoryVectorStore, IndexedEntry, Indexer,
    PageText, RagError, VectorStore,
};

const COLLECTION: &str = "documents";

fn chunk(id: &str, source: &str, text: &str) -> Chunk {
    Chunk::new(id, text, ChunkMetadata::new(source, 1, "medical_report"))
}

async fn store() -> Arc<InMemoryVectorStore> {
    let store = Arc::new(InMemoryVectorStore::new());
    store.create_collection(COLLECTION, 0).await.unwrap();
    store
}

#[tokio::test]
async fn reindexing_replaces_previous_entries() {
    let store = store().await;
    let indexer = Indexer::new(Arc::new(KeywordEmbedder::new()), store.clone(), COLLECTION);

    let first = [
        chunk("r_p1_c0", "report.pdf", "Patient BP 120/80"),
        chunk("r_p1_c1", "report.pdf", "Diagnosis: hypertension"),
        chunk("r_p1_c2", "report.pdf", "Medication dose"),
    ];
    assert_eq!(indexer.index(&first, "report.pdf").await.unwrap(), 3);

    let second = [chunk("r_p1_c0", "report.pdf", "Heart rate normal")];
    assert_eq!(indexer.index(&second, "report.pdf").await.unwrap(), 1);
    assert_eq!(store.count(COLLECTION).await.unwrap(), 1);
}

#[tokio::test]
async fn indexing_is_idempotent() {
    let store = store().await;
    let indexer = Indexer::new(Arc::new(KeywordEmbedder::new()), store.clone(), COLLECTION);
    let chunker = FixedWindowChunker::new(100, 80, 10);
    let pages = [PageText::new(1, "Patient history: blood pressure normal, heart rate normal.")];

    let chunks = chunker.chunk(&pages, "report.pdf");
    indexer.index(&chunks, "report.pdf").await.unwrap();
    let again = chunker.chunk(&pages, "report.pdf");
    indexer.index(&again, "report.pdf").await.unwrap();

    assert_eq!(chunks, again);
    assert_eq!(store.count(COLLECTION).await.unwrap(), chunks.len());
}

#[tokio::test]
async fn empty_input_clears_source_without_embedding() {
    let store = store().await;
    let embedder = Arc::new(KeywordEmbedder::new());
    let indexer = Indexer::new(embedder.clone(), store.clone(), COLLECTION);

    indexer.index(&[chunk("a", "report.pdf", "Patient BP")], "report.pdf").await.unwrap();
    indexer.index(&[chunk("b", "other.pdf", "Allergy history")], "other.pdf").await.unwrap();
    let calls = embedder.calls();

    assert_eq!(indexer.index(&[], "report.pdf").await.unwrap(), 0);
    assert_eq!(embedder.calls(), calls);
    assert_eq!(store.count(COLLECTION).await.unwrap(), 1);
}

#[tokio::test]
async fn provider_failure_leaves_collection_untouched() {
    let store = store().await;
    Indexer::new(Arc::new(KeywordEmbedder::new()), store.clone(), COLLECTION)
        .index(&[chunk("a", "report.pdf", "Patient BP")], "report.pdf")
        .await
        .unwrap();

    let failing = Indexer::new(Arc::new(FailingEmbedder), store.clone(), COLLECTION);
    let err = failing.index(&[chunk("b", "report.pdf", "Diagnosis")], "report.pdf").await;

    assert!(matches!(err, Err(RagError::EmbeddingError { .. })));
    assert_eq!(store.count(COLLECTION).await.unwrap(), 1);
}

#[tokio::test]
async fn short_batch_is_an_embedding_error() {
    let store = store().await;
    let indexer = Indexer::new(Arc::new(ShortBatchEmbedder), store.clone(), COLLECTION);

    let chunks = [chunk("a", "report.pdf", "one"), chunk("b", "report.pdf", "two")];
    let err = indexer.index(&chunks, "report.pdf").await.unwrap_err();

    match err {
        RagError::EmbeddingError { message, .. } => assert!(message.contains("expected 2")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.count(COLLECTION).await.unwrap(), 0);
}

#[tokio::test]
async fn chunks_from_another_source_are_rejected() {
    let store = store().await;
    let indexer = Indexer::new(Arc::new(KeywordEmbedder::new()), store, COLLECTION);
    let err = indexer.index(&[chunk("a", "other.pdf", "text")], "report.pdf").await;
    assert!(matches!(err, Err(RagError::InvalidArgument(_))));
}

#[tokio::test]
async fn rejected_batch_keeps_previous_entries() {
    let store = Arc::new(InMemoryVectorStore::new());
    store.create_collection(COLLECTION, 2).await.unwrap();
    store
        .upsert(
            COLLECTION,
            &[
                IndexedEntry::new(chunk("r_p1_c0", "report.pdf", "Patient BP 120/80"), vec![1.0, 0.0]),
                IndexedEntry::new(chunk("r_p1_c1", "report.pdf", "Diagnosis"), vec![0.0, 1.0]),
            ],
        )
        .await
        .unwrap();

    // The keyword embedder produces wider vectors than the collection holds.
    let indexer = Indexer::new(Arc::new(KeywordEmbedder::new()), store.clone(), COLLECTION);
    let err = indexer.index(&[chunk("r_p1_c0", "report.pdf", "Heart rate normal")], "report.pdf").await;

    assert!(matches!(err, Err(RagError::VectorStoreError { .. })));
    assert_eq!(store.count(COLLECTION).await.unwrap(), 2);
}

#[tokio::test]
async fn colliding_chunk_ids_across_sources_are_rejected() {
    let store = store().await;
    let indexer = Indexer::new(Arc::new(KeywordEmbedder::new()), store.clone(), COLLECTION);
    let chunker = FixedWindowChunker::new(100, 80, 10);
    let pages = [PageText::new(1, "Patient history: blood pressure normal.")];

    let spaced = chunker.chunk(&pages, "lab report.pdf");
    let underscored = chunker.chunk(&pages, "lab_report.pdf");
    assert_eq!(spaced[0].id, underscored[0].id);

    indexer.index(&spaced, "lab report.pdf").await.unwrap();
    let err = indexer.index(&underscored, "lab_report.pdf").await;

    assert!(matches!(err, Err(RagError::VectorStoreError { .. })));
    let results = store.search(COLLECTION, &[1.0; 17], 5, None).await.unwrap();
    assert_eq!(results.len(), spaced.len());
    assert!(results.iter().all(|r| r.chunk.source() == "lab report.pdf"));
}
