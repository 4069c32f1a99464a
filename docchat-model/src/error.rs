//! Error types for the `docchat-model` crate.

use thiserror::Error;

/// Errors raised by text-generation providers.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider could not be constructed from the given configuration.
    #[error("Model configuration error: {0}")]
    Config(String),

    /// The request could not be built or sent, or the provider rejected it.
    #[error("Model request failed ({provider}): {message}")]
    Request {
        /// The provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The provider answered but the reply carried no text.
    #[error("Model returned an empty response ({provider})")]
    EmptyResponse {
        /// The provider that produced the error.
        provider: String,
    },
}

impl ModelError {
    /// Name of the provider that failed, when known.
    pub fn provider(&self) -> Option<&str> {
        match self {
            ModelError::Config(_) => None,
            ModelError::Request { provider, .. } | ModelError::EmptyResponse { provider } => {
                Some(provider)
            }
        }
    }
}

/// A convenience result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
