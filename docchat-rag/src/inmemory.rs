//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and small-scale use cases. The collection type
//! defined here is also what [`LocalVectorStore`](crate::local::LocalVectorStore)
//! persists to disk.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::document::{IndexedEntry, SearchResult};
use crate::error::{RagError, Result};
use crate::filter::MetadataFilter;
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// One named collection: a fixed vector dimension plus entries keyed by id.
///
/// Entries live in a `BTreeMap` so iteration (and therefore tie order in
/// search and on-disk layout) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub(crate) struct Collection {
    /// 0 until the first vector is stored.
    pub(crate) dimensions: usize,
    pub(crate) entries: BTreeMap<String, IndexedEntry>,
}

impl Collection {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self { dimensions, entries: BTreeMap::new() }
    }

    /// Validate the whole batch, then insert it.
    pub(crate) fn upsert(&mut self, entries: &[IndexedEntry], backend: &str) -> Result<()> {
        let dimensions = self.batch_dimensions(entries, backend)?;
        self.insert(entries, dimensions);
        Ok(())
    }

    /// Drop every entry matching `filter` and insert `entries`, or change
    /// nothing when the batch is rejected.
    ///
    /// An incoming id already held by an entry the filter does not match
    /// (i.e. owned by another source) is rejected rather than overwritten.
    pub(crate) fn replace_where(
        &mut self,
        filter: &MetadataFilter,
        entries: &[IndexedEntry],
        backend: &str,
    ) -> Result<usize> {
        let dimensions = self.batch_dimensions(entries, backend)?;
        for entry in entries {
            if let Some(existing) = self.entries.get(entry.id()) {
                if !filter.matches(&existing.chunk.metadata) {
                    return Err(RagError::store(
                        backend,
                        format!(
                            "entry id '{}' already belongs to source '{}'",
                            entry.id(),
                            existing.chunk.source()
                        ),
                    ));
                }
            }
        }

        let removed = self.delete_where(filter);
        self.insert(entries, dimensions);
        Ok(removed)
    }

    /// Dimension the collection will have after storing `entries`.
    fn batch_dimensions(&self, entries: &[IndexedEntry], backend: &str) -> Result<usize> {
        let mut dimensions = self.dimensions;
        for entry in entries {
            let len = entry.embedding.len();
            if len == 0 {
                return Err(RagError::store(
                    backend,
                    format!("entry '{}' has an empty embedding", entry.id()),
                ));
            }
            if dimensions == 0 {
                dimensions = len;
            } else if len != dimensions {
                return Err(RagError::store(
                    backend,
                    format!(
                        "entry '{}' has dimension {len}, collection expects {dimensions}",
                        entry.id()
                    ),
                ));
            }
        }
        Ok(dimensions)
    }

    fn insert(&mut self, entries: &[IndexedEntry], dimensions: usize) {
        self.dimensions = dimensions;
        for entry in entries {
            self.entries.insert(entry.chunk.id.clone(), entry.clone());
        }
    }

    pub(crate) fn delete_where(&mut self, filter: &MetadataFilter) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !filter.matches(&entry.chunk.metadata));
        before - self.entries.len()
    }

    pub(crate) fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
        backend: &str,
    ) -> Result<Vec<SearchResult>> {
        if self.dimensions != 0 && embedding.len() != self.dimensions {
            return Err(RagError::store(
                backend,
                format!(
                    "query has dimension {}, collection expects {}",
                    embedding.len(),
                    self.dimensions
                ),
            ));
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .values()
            .filter(|entry| filter.is_none_or(|f| f.matches(&entry.chunk.metadata)))
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// An in-memory vector store using cosine similarity for search.
///
/// Collections are stored as nested maps: collection name → chunk ID → entry.
/// All operations are async-safe via `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn missing_collection(backend: &str, collection: &str) -> RagError {
    RagError::store(backend, format!("collection '{collection}' does not exist"))
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        let collection =
            collections.entry(name.to_string()).or_insert_with(|| Collection::new(dimensions));
        if collection.dimensions == 0 {
            collection.dimensions = dimensions;
        }
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store =
            collections.get_mut(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        store.upsert(entries, BACKEND)
    }

    async fn delete_where(&self, collection: &str, filter: &MetadataFilter) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let store =
            collections.get_mut(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        Ok(store.delete_where(filter))
    }

    async fn replace_where(
        &self,
        collection: &str,
        filter: &MetadataFilter,
        entries: &[IndexedEntry],
    ) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let store =
            collections.get_mut(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        store.replace_where(filter, entries, BACKEND)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        Ok(store.entries.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        store.search(embedding, top_k, filter, BACKEND)
    }
}
