//! Configuration for the OpenAI chat model.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// The default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection and sampling settings for [`OpenAIChatModel`](super::OpenAIChatModel).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAIChatConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model identifier, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Override for OpenAI-compatible servers (Ollama, vLLM, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl OpenAIChatConfig {
    /// Config for the hosted OpenAI API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            organization_id: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Config for an OpenAI-compatible server at `base_url`.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self { base_url: Some(base_url.into()), ..Self::new(api_key, model) }
    }

    /// Read `OPENAI_API_KEY`, and optionally `OPENAI_BASE_URL` and
    /// `OPENAI_MODEL` (default [`DEFAULT_MODEL`]).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ModelError::Config("OPENAI_API_KEY environment variable not set".into())
        })?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let mut config = Self::new(api_key, model);
        config.base_url = std::env::var("OPENAI_BASE_URL").ok().filter(|url| !url.is_empty());
        Ok(config)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Check that the config can produce a working client.
    ///
    /// A key is mandatory for the hosted API; compatible servers often
    /// accept any key, so an empty one is allowed when `base_url` is set.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ModelError::Config("model must not be empty".into()));
        }
        if self.api_key.is_empty() && self.base_url.is_none() {
            return Err(ModelError::Config("API key must not be empty".into()));
        }
        Ok(())
    }
}
