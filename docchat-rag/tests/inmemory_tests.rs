//! Property tests for in-memory vector store search ordering.

use std::collections::HashMap;

use docchat_rag::document::{Chunk, ChunkMetadata, IndexedEntry};
use docchat_rag::filter::MetadataFilter;
use docchat_rag::inmemory::InMemoryVectorStore;
use docchat_rag::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate an entry from one of two sources with a normalized embedding.
fn arb_entry(dim: usize) -> impl Strategy<Value = IndexedEntry> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", prop_oneof![Just("a.pdf"), Just("b.pdf")], arb_normalized_embedding(dim))
        .prop_map(|(id, text, source, embedding)| {
            IndexedEntry::new(
                Chunk::new(id, text, ChunkMetadata::new(source, 1, "document")),
                embedding,
            )
        })
}

fn dedup(entries: &[IndexedEntry]) -> Vec<IndexedEntry> {
    let mut deduped: HashMap<String, IndexedEntry> = HashMap::new();
    for entry in entries {
        deduped.entry(entry.chunk.id.clone()).or_insert_with(|| entry.clone());
    }
    deduped.into_values().collect()
}

/// Searching returns at most `top_k` results in descending score order.
mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            entries in proptest::collection::vec(arb_entry(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count) = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();

                let unique = dedup(&entries);
                let count = unique.len();

                store.upsert("test", &unique).await.unwrap();
                let results = store.search("test", &query, top_k, None).await.unwrap();
                (results, count)
            });

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= unique_count);

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }

        #[test]
        fn filtered_results_only_contain_matching_source(
            entries in proptest::collection::vec(arb_entry(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();
                store.upsert("test", &dedup(&entries)).await.unwrap();
                let filter = MetadataFilter::source("a.pdf");
                store.search("test", &query, 50, Some(&filter)).await.unwrap()
            });

            prop_assert!(results.iter().all(|r| r.chunk.source() == "a.pdf"));
        }
    }
}
