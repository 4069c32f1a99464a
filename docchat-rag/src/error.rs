//! Error types for the `docchat-rag` crate.

use docchat_model::ModelError;
use thiserror::Error;

/// Errors that can occur while indexing, retrieving or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// The caller passed an unusable value (zero `top_k`, blank query,
    /// chunks tagged with a different source, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The embedding provider failed, was unreachable, or returned vectors
    /// that do not line up with the input.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A query was issued against a collection with no entries.
    #[error("Collection '{collection}' is empty: nothing has been indexed yet")]
    EmptyCollection {
        /// The collection that was queried.
        collection: String,
    },

    /// The text-generation provider failed to produce an answer.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The document could not be read at all.
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    /// Whether the caller should present a normal "nothing indexed yet"
    /// state instead of a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RagError::EmptyCollection { .. })
    }

    pub(crate) fn embedding(provider: &str, message: impl Into<String>) -> Self {
        RagError::EmbeddingError { provider: provider.to_string(), message: message.into() }
    }

    pub(crate) fn store(backend: &str, message: impl Into<String>) -> Self {
        RagError::VectorStoreError { backend: backend.to_string(), message: message.into() }
    }
}

impl From<ModelError> for RagError {
    fn from(err: ModelError) -> Self {
        let provider = err.provider().unwrap_or("model").to_string();
        RagError::GenerationError { provider, message: err.to_string() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
