//! Data types for pages, chunks, indexed entries and search results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw text of one document page, as produced by text extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text. Empty when the page had no extractable text.
    pub text: String,
}

impl PageText {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self { number, text: text.into() }
    }
}

/// Provenance attached to every [`Chunk`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Identifier of the originating document (usually its file name).
    pub source: String,
    /// 1-based page the chunk was cut from.
    pub page: u32,
    /// Document category tag.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Free-form extra fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ChunkMetadata {
    pub fn new(source: impl Into<String>, page: u32, doc_type: impl Into<String>) -> Self {
        Self { source: source.into(), page, doc_type: doc_type.into(), extra: BTreeMap::new() }
    }

    /// Add an extra metadata field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A retrievable window of document text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Deterministic identifier, `{source}_p{page}_c{window}`.
    pub id: String,
    /// Trimmed, non-empty chunk text.
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self { id: id.into(), text: text.into(), metadata }
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    pub fn page(&self) -> u32 {
        self.metadata.page
    }
}

/// A [`Chunk`] paired with its embedding, as stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedEntry {
    pub chunk: Chunk,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
}

impl IndexedEntry {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self { chunk, embedding }
    }

    pub fn id(&self) -> &str {
        &self.chunk.id
    }
}

/// A retrieved [`Chunk`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// Ranked retrieval output, most similar first.
pub type QueryResult = Vec<SearchResult>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_category_as_type() {
        let metadata = ChunkMetadata::new("report.pdf", 2, "medical_report");
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "medical_report");
        assert_eq!(json["page"], 2);
        assert!(json.get("extra").is_none());
    }

    #[test]
    fn extra_fields_survive_round_trip() {
        let metadata = ChunkMetadata::new("a.pdf", 1, "document").with_extra("lang", "en");
        let json = serde_json::to_string(&metadata).unwrap();
        let back: ChunkMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extra.get("lang").map(String::as_str), Some("en"));
    }
}
