//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! Qdrant only accepts UUID or integer point ids, so each chunk id is mapped
//! to a name-based (v5) UUID and the original id is kept in the payload.
//!
//! Qdrant has no transaction spanning a filtered delete and an upsert, so
//! [`VectorStore::replace_where`] uses the trait's delete-then-upsert
//! default here: if the upsert fails, the source is left without entries.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::new("http://localhost:6334")?;
//! store.create_collection("docs", 1536).await?;
//! store.upsert("docs", &entries).await?;
//! let results = store.search("docs", &query_embedding, 5, None).await?;
//! ```

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::document::{Chunk, ChunkMetadata, IndexedEntry, SearchResult};
use crate::error::{RagError, Result};
use crate::filter::{MetadataField, MetadataFilter, MetadataValue};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "qdrant";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Wraps a [`qdrant_client::Qdrant`] client and maps collections to Qdrant
/// collections with cosine distance. Chunk metadata is stored as top-level
/// payload fields (`source`, `page`, `type`, `extra`) so it can be filtered.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store with default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::store(BACKEND, e.to_string())
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn extract_integer(value: &QdrantValue) -> Option<i64> {
        match &value.kind {
            Some(Kind::IntegerValue(n)) => Some(*n),
            Some(Kind::DoubleValue(d)) => Some(*d as i64),
            _ => None,
        }
    }
}

/// Deterministic point id for a chunk id.
pub fn point_id(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, chunk_id.as_bytes()).to_string()
}

fn payload_key(field: &MetadataField) -> String {
    match field {
        MetadataField::Extra(name) => format!("extra.{name}"),
        other => other.key().to_string(),
    }
}

/// Value to match in the payload. Extra metadata is stored as strings, so
/// integers compared against it become keyword matches.
fn match_value(filter: &MetadataFilter) -> MetadataValue {
    match (&filter.field, &filter.value) {
        (MetadataField::Extra(_), MetadataValue::Integer(n)) => MetadataValue::Text(n.to_string()),
        (_, value) => value.clone(),
    }
}

fn to_qdrant_filter(filter: &MetadataFilter) -> Filter {
    let key = payload_key(&filter.field);
    let condition = match match_value(filter) {
        MetadataValue::Text(text) => Condition::matches(key, text),
        MetadataValue::Integer(n) => Condition::matches(key, n),
    };
    Filter::must([condition])
}

fn to_payload(entry: &IndexedEntry) -> Result<Payload> {
    let chunk = &entry.chunk;
    let value = json!({
        "chunk_id": chunk.id,
        "text": chunk.text,
        "source": chunk.metadata.source,
        "page": chunk.metadata.page,
        "type": chunk.metadata.doc_type,
        "extra": chunk.metadata.extra,
    });
    Payload::try_from(value).map_err(|e| {
        RagError::store(BACKEND, format!("invalid payload for '{}': {e}", chunk.id))
    })
}

fn from_payload(payload: &HashMap<String, QdrantValue>) -> Chunk {
    let string = |key: &str| payload.get(key).and_then(QdrantVectorStore::extract_string);
    let extra: BTreeMap<String, String> = payload
        .get("extra")
        .and_then(|v| match &v.kind {
            Some(Kind::StructValue(s)) => Some(
                s.fields
                    .iter()
                    .filter_map(|(k, v)| {
                        QdrantVectorStore::extract_string(v).map(|s| (k.clone(), s))
                    })
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default();
    let page = payload
        .get("page")
        .and_then(QdrantVectorStore::extract_integer)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default();

    Chunk {
        id: string("chunk_id").unwrap_or_default(),
        text: string("text").unwrap_or_default(),
        metadata: ChunkMetadata {
            source: string("source").unwrap_or_default(),
            page,
            doc_type: string("type").unwrap_or_default(),
            extra,
        },
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        let exists = collections.collections.iter().any(|c| c.name == name);
        if exists {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }
        if dimensions == 0 {
            return Err(RagError::store(
                BACKEND,
                format!("cannot create '{name}' without a vector dimension"),
            ));
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let points = entries
            .iter()
            .map(|entry| {
                Ok(PointStruct::new(
                    point_id(&entry.chunk.id),
                    entry.embedding.clone(),
                    to_payload(entry)?,
                ))
            })
            .collect::<Result<Vec<PointStruct>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = entries.len(), "upserted entries to qdrant");
        Ok(())
    }

    async fn delete_where(&self, collection: &str, filter: &MetadataFilter) -> Result<usize> {
        let matching = self
            .client
            .count(CountPointsBuilder::new(collection).filter(to_qdrant_filter(filter)).exact(true))
            .await
            .map_err(Self::map_err)?
            .result
            .map(|r| r.count as usize)
            .unwrap_or_default();

        if matching == 0 {
            return Ok(0);
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(collection).points(to_qdrant_filter(filter)).wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection, %filter, removed = matching, "deleted points from qdrant");
        Ok(matching)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(Self::map_err)?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or_default())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let mut request = SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
            .with_payload(true);
        if let Some(filter) = filter {
            request = request.filter(to_qdrant_filter(filter));
        }

        let response = self.client.search_points(request).await.map_err(Self::map_err)?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| SearchResult { chunk: from_payload(&scored.payload), score: scored.score })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_uuids() {
        let a = point_id("report.pdf_p1_c0");
        assert_eq!(a, point_id("report.pdf_p1_c0"));
        assert_ne!(a, point_id("report.pdf_p1_c1"));
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn extra_fields_use_nested_payload_keys() {
        assert_eq!(payload_key(&MetadataField::Source), "source");
        assert_eq!(payload_key(&MetadataField::DocType), "type");
        assert_eq!(payload_key(&MetadataField::Extra("ward".into())), "extra.ward");
    }

    #[test]
    fn integer_extra_filters_match_stored_strings() {
        let filter = MetadataFilter::eq(MetadataField::Extra("ward".into()), 7i64);
        assert_eq!(match_value(&filter), MetadataValue::Text("7".to_string()));

        let page = MetadataFilter::eq(MetadataField::Page, 7i64);
        assert_eq!(match_value(&page), MetadataValue::Integer(7));
    }

    #[test]
    fn payload_round_trips_chunk_fields() {
        let entry = IndexedEntry::new(
            Chunk::new(
                "a_p2_c0",
                "Diagnosis: hypertension",
                ChunkMetadata::new("a.pdf", 2, "medical_report").with_extra("ward", "7"),
            ),
            vec![0.1, 0.2],
        );
        let payload: HashMap<String, QdrantValue> = to_payload(&entry).unwrap().into();
        assert_eq!(from_payload(&payload), entry.chunk);
    }
}
