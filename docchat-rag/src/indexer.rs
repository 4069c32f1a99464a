//! Chunk indexing.
//!
//! [`Indexer`] embeds a source document's chunks and replaces whatever the
//! collection held for that source. Embedding happens before any mutation,
//! and the replacement is a single [`VectorStore::replace_where`] call, so a
//! failed index leaves the collection exactly as it was on stores that
//! replace atomically (in-memory and local).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info};

use crate::document::{Chunk, IndexedEntry};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::filter::MetadataFilter;
use crate::vectorstore::VectorStore;

/// Writes the chunks of one source document into a collection.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::Indexer;
///
/// let indexer = Indexer::new(embedder, store, "documents");
/// let stored = indexer.index(&chunks, "report.pdf").await?;
/// ```
pub struct Indexer {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
}

impl Indexer {
    /// Create an indexer writing to `collection`.
    ///
    /// The collection must already exist in the store (see
    /// [`VectorStore::create_collection`]).
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

    /// Replace every entry of `source_id` with `chunks`.
    ///
    /// Returns the number of chunks stored. With no chunks the source is
    /// only cleared and the provider is not called.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] if a chunk belongs to another source
    ///   or two chunks share an id.
    /// - [`RagError::EmbeddingError`] if the provider fails or returns
    ///   vectors that do not line up with the chunks.
    /// - [`RagError::VectorStoreError`] if the store rejects the batch, for
    ///   example vectors of the wrong dimension or a chunk id already owned
    ///   by another source.
    ///
    /// On failure the source keeps its previous entries.
    pub async fn index(&self, chunks: &[Chunk], source_id: &str) -> Result<usize> {
        validate_chunks(chunks, source_id)?;

        let entries = if chunks.is_empty() { Vec::new() } else { self.embed(chunks, source_id).await? };

        let filter = MetadataFilter::source(source_id);
        let removed = self
            .vector_store
            .replace_where(&self.collection, &filter, &entries)
            .await
            .map_err(|e| {
                error!(source = source_id, collection = %self.collection, error = %e, "failed to replace source entries");
                e
            })?;

        info!(
            source = source_id,
            collection = %self.collection,
            chunk_count = entries.len(),
            replaced = removed,
            "indexed document"
        );
        Ok(entries.len())
    }

    async fn embed(&self, chunks: &[Chunk], source_id: &str) -> Result<Vec<IndexedEntry>> {
        let provider = self.embedding_provider.name().to_string();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(source = source_id, error = %e, "embedding failed during indexing");
            e
        })?;

        if embeddings.len() != chunks.len() {
            error!(
                source = source_id,
                expected = chunks.len(),
                received = embeddings.len(),
                "embedding count mismatch"
            );
            return Err(RagError::EmbeddingError {
                provider,
                message: format!(
                    "expected {} embeddings, received {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
        if dimensions == 0 || embeddings.iter().any(|e| e.len() != dimensions) {
            error!(source = source_id, "embedding dimensions are empty or inconsistent");
            return Err(RagError::EmbeddingError {
                provider,
                message: "embeddings have empty or inconsistent dimensions".to_string(),
            });
        }

        Ok(chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexedEntry::new(chunk, embedding))
            .collect())
    }
}

fn validate_chunks(chunks: &[Chunk], source_id: &str) -> Result<()> {
    if source_id.trim().is_empty() {
        return Err(RagError::InvalidArgument("source id must not be empty".to_string()));
    }
    let mut seen = HashSet::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.source() != source_id {
            return Err(RagError::InvalidArgument(format!(
                "chunk '{}' belongs to '{}', not '{source_id}'",
                chunk.id,
                chunk.source()
            )));
        }
        if !seen.insert(chunk.id.as_str()) {
            return Err(RagError::InvalidArgument(format!("duplicate chunk id '{}'", chunk.id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChunkMetadata;

    fn chunk(id: &str, source: &str) -> Chunk {
        Chunk::new(id, "text", ChunkMetadata::new(source, 1, "document"))
    }

    #[test]
    fn foreign_chunks_are_rejected() {
        let err = validate_chunks(&[chunk("a", "a.pdf"), chunk("b", "b.pdf")], "a.pdf").unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = validate_chunks(&[chunk("a", "a.pdf"), chunk("a", "a.pdf")], "a.pdf").unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
    }

    #[test]
    fn blank_source_is_rejected() {
        assert!(validate_chunks(&[], "  ").is_err());
        assert!(validate_chunks(&[], "a.pdf").is_ok());
    }
}
