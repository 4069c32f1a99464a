//! Query-time retrieval.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::document::QueryResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::filter::MetadataFilter;
use crate::vectorstore::VectorStore;

/// Finds the chunks most similar to a question.
///
/// Must share its embedding provider (or at least its model) with the
/// [`Indexer`](crate::Indexer) that filled the collection.
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
}

impl Retriever {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self { embedding_provider, vector_store, collection: collection.into() }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Return up to `top_k` chunks ordered by descending similarity.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] for `top_k == 0` or a blank query.
    /// - [`RagError::EmptyCollection`] when nothing has been indexed.
    /// - [`RagError::EmbeddingError`] if the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<QueryResult> {
        self.retrieve_filtered(query, top_k, None).await
    }

    /// Like [`retrieve`](Self::retrieve), restricted to entries matching
    /// `filter` (for example a single source document).
    pub async fn retrieve_filtered(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<QueryResult> {
        if top_k == 0 {
            return Err(RagError::InvalidArgument("top_k must be greater than zero".to_string()));
        }
        if query.trim().is_empty() {
            return Err(RagError::InvalidArgument("query must not be empty".to_string()));
        }

        let count = self.vector_store.count(&self.collection).await?;
        if count == 0 {
            debug!(collection = %self.collection, "query against empty collection");
            return Err(RagError::EmptyCollection { collection: self.collection.clone() });
        }

        let embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;
        if embedding.is_empty() {
            error!(provider = self.embedding_provider.name(), "provider returned an empty query vector");
            return Err(RagError::embedding(
                self.embedding_provider.name(),
                "empty embedding returned for query",
            ));
        }

        let results =
            self.vector_store.search(&self.collection, &embedding, top_k, filter).await.map_err(
                |e| {
                    error!(collection = %self.collection, error = %e, "vector store search failed");
                    e
                },
            )?;

        info!(
            collection = %self.collection,
            top_k,
            filtered = filter.is_some(),
            result_count = results.len(),
            "query completed"
        );
        Ok(results)
    }
}
