//! Configuration for chunking, indexing and retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the document chat pipeline.
///
/// Window sizes are counted in characters (Unicode scalar values), not bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    /// Characters per chunk window.
    pub window_size: usize,
    /// Characters the window advances between chunks. Overlap is
    /// `window_size - stride`.
    pub stride: usize,
    /// Windows whose trimmed text is shorter than this are dropped.
    pub min_chunk_chars: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Name of the vector collection holding the indexed chunks.
    pub collection: String,
    /// Category tag written to every chunk's `type` metadata field.
    pub document_type: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            window_size: 500,
            stride: 400,
            min_chunk_chars: 80,
            top_k: 3,
            collection: "documents".to_string(),
            document_type: "document".to_string(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Overlap between consecutive windows, in characters.
    pub fn overlap(&self) -> usize {
        self.window_size.saturating_sub(self.stride)
    }

    /// Check the invariants enforced by [`RagConfigBuilder::build`].
    ///
    /// Useful for configs obtained through deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(RagError::ConfigError("stride must be greater than zero".to_string()));
        }
        if self.stride > self.window_size {
            return Err(RagError::ConfigError(format!(
                "stride ({}) must not exceed window_size ({})",
                self.stride, self.window_size
            )));
        }
        if self.min_chunk_chars > self.window_size {
            return Err(RagError::ConfigError(format!(
                "min_chunk_chars ({}) must not exceed window_size ({})",
                self.min_chunk_chars, self.window_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::ConfigError("collection name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the chunk window size in characters.
    pub fn window_size(mut self, size: usize) -> Self {
        self.config.window_size = size;
        self
    }

    /// Set the window stride in characters.
    pub fn stride(mut self, stride: usize) -> Self {
        self.config.stride = stride;
        self
    }

    /// Set the minimum trimmed length a window needs to be kept.
    pub fn min_chunk_chars(mut self, chars: usize) -> Self {
        self.config.min_chunk_chars = chars;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the document category tag.
    pub fn document_type(mut self, tag: impl Into<String>) -> Self {
        self.config.document_type = tag.into();
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `stride == 0` or `stride > window_size`
    /// - `min_chunk_chars > window_size`
    /// - `top_k == 0`
    /// - the collection name is blank
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_document_chat_tuning() {
        let config = RagConfig::default();
        assert_eq!(config.window_size, 500);
        assert_eq!(config.stride, 400);
        assert_eq!(config.overlap(), 100);
        assert_eq!(config.min_chunk_chars, 80);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_stride_is_rejected() {
        let err = RagConfig::builder().stride(0).build().unwrap_err();
        assert!(matches!(err, RagError::ConfigError(_)));
    }

    #[test]
    fn stride_larger_than_window_is_rejected() {
        assert!(RagConfig::builder().window_size(100).stride(150).build().is_err());
    }

    #[test]
    fn zero_top_k_is_rejected() {
        assert!(RagConfig::builder().top_k(0).build().is_err());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: RagConfig =
            serde_json::from_str(r#"{"collection":"medical_reports","top_k":5}"#).unwrap();
        assert_eq!(config.collection, "medical_reports");
        assert_eq!(config.top_k, 5);
        assert_eq!(config.window_size, 500);
    }
}
