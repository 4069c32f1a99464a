//! Structured metadata filters.
//!
//! Deletion and narrowed search take a [`MetadataFilter`] (one field, one
//! equality predicate) rather than a free-form map, so every backend
//! interprets the same small contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::ChunkMetadata;

/// A metadata field that can be filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataField {
    Source,
    Page,
    DocType,
    Extra(String),
}

impl MetadataField {
    /// The field's key in stored metadata.
    pub fn key(&self) -> &str {
        match self {
            MetadataField::Source => "source",
            MetadataField::Page => "page",
            MetadataField::DocType => "type",
            MetadataField::Extra(name) => name,
        }
    }
}

/// The value a field is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<u32> for MetadataValue {
    fn from(value: u32) -> Self {
        MetadataValue::Integer(i64::from(value))
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => write!(f, "{s:?}"),
            MetadataValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// `field == value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub field: MetadataField,
    pub value: MetadataValue,
}

impl MetadataFilter {
    pub fn eq(field: MetadataField, value: impl Into<MetadataValue>) -> Self {
        Self { field, value: value.into() }
    }

    /// Match every chunk from one source document.
    pub fn source(source: impl Into<String>) -> Self {
        Self::eq(MetadataField::Source, MetadataValue::Text(source.into()))
    }

    /// Match every chunk cut from one page.
    pub fn page(page: u32) -> Self {
        Self::eq(MetadataField::Page, page)
    }

    /// Evaluate the predicate against chunk metadata.
    ///
    /// A value of the wrong kind for the field (e.g. text for `page`) never
    /// matches. Extra fields are stored as strings, so integer values are
    /// compared against their decimal form.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match (&self.field, &self.value) {
            (MetadataField::Source, MetadataValue::Text(v)) => metadata.source == *v,
            (MetadataField::Page, MetadataValue::Integer(v)) => i64::from(metadata.page) == *v,
            (MetadataField::DocType, MetadataValue::Text(v)) => metadata.doc_type == *v,
            (MetadataField::Extra(key), MetadataValue::Text(v)) => metadata.extra.get(key) == Some(v),
            (MetadataField::Extra(key), MetadataValue::Integer(v)) => {
                metadata.extra.get(key).is_some_and(|s| *s == v.to_string())
            }
            _ => false,
        }
    }
}

impl fmt::Display for MetadataFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.field.key(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ChunkMetadata {
        ChunkMetadata::new("report.pdf", 3, "medical_report").with_extra("ward", "7")
    }

    #[test]
    fn source_filter_matches_exact_source_only() {
        assert!(MetadataFilter::source("report.pdf").matches(&metadata()));
        assert!(!MetadataFilter::source("report").matches(&metadata()));
    }

    #[test]
    fn page_filter_compares_integers() {
        assert!(MetadataFilter::page(3).matches(&metadata()));
        assert!(!MetadataFilter::page(4).matches(&metadata()));
        assert!(!MetadataFilter::eq(MetadataField::Page, "3").matches(&metadata()));
    }

    #[test]
    fn extra_fields_accept_text_and_integers() {
        let ward = MetadataField::Extra("ward".into());
        assert!(MetadataFilter::eq(ward.clone(), "7").matches(&metadata()));
        assert!(MetadataFilter::eq(ward, 7i64).matches(&metadata()));
        assert!(!MetadataFilter::eq(MetadataField::Extra("bed".into()), "7").matches(&metadata()));
    }

    #[test]
    fn display_uses_stored_key_names() {
        assert_eq!(MetadataFilter::source("a.pdf").to_string(), "source == \"a.pdf\"");
        assert_eq!(MetadataFilter::eq(MetadataField::DocType, "x").field.key(), "type");
    }
}
