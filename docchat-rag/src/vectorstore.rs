//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{IndexedEntry, SearchResult};
use crate::error::Result;
use crate::filter::MetadataFilter;

/// A storage backend for vector embeddings with similarity search.
///
/// Implementations manage named collections of [`IndexedEntry`]s and support
/// upserting, deleting by metadata, counting and searching by vector
/// similarity. Entries are keyed by chunk id; upserting an existing id
/// replaces it.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{InMemoryVectorStore, MetadataFilter, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("docs", 384).await?;
/// store.delete_where("docs", &MetadataFilter::source("report.pdf")).await?;
/// store.upsert("docs", &entries).await?;
/// let results = store.search("docs", &query_embedding, 5, None).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Open a named collection, creating it if it does not exist.
    ///
    /// `dimensions` may be 0 when unknown; the collection then adopts the
    /// dimension of the first upserted vector.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert entries into a collection as one batch.
    ///
    /// Either every entry is written or, on error, none is.
    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<()>;

    /// Delete every entry whose metadata matches `filter`.
    ///
    /// Returns the number of entries removed.
    async fn delete_where(&self, collection: &str, filter: &MetadataFilter) -> Result<usize>;

    /// Delete every entry matching `filter` and upsert `entries` as one
    /// operation, returning the number of entries removed.
    ///
    /// Stores that can do so apply both halves atomically: if the batch is
    /// rejected, the matching entries are still there. The default
    /// implementation deletes and then upserts, so a failed upsert leaves
    /// the matching entries removed.
    async fn replace_where(
        &self,
        collection: &str,
        filter: &MetadataFilter,
        entries: &[IndexedEntry],
    ) -> Result<usize> {
        let removed = self.delete_where(collection, filter).await?;
        self.upsert(collection, entries).await?;
        Ok(removed)
    }

    /// Number of entries in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Search for the `top_k` most similar entries to the given embedding,
    /// optionally restricted to entries matching `filter`.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>>;
}
