//! OpenAI chat completion client.

use async_openai::{
    Client,
    config::OpenAIConfig as AsyncOpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use tracing::{debug, error};

use super::config::OpenAIChatConfig;
use crate::error::{ModelError, Result};
use crate::generator::TextGenerator;

const PROVIDER: &str = "OpenAI";

/// A [`TextGenerator`] backed by the OpenAI chat completions API or any
/// OpenAI-compatible server.
///
/// The prompt is sent as a single user message and the first choice's
/// content is returned as-is.
pub struct OpenAIChatModel {
    client: Client<AsyncOpenAIConfig>,
    config: OpenAIChatConfig,
}

impl OpenAIChatModel {
    /// Create a new chat model client.
    pub fn new(config: OpenAIChatConfig) -> Result<Self> {
        config.validate()?;

        let mut openai_config = AsyncOpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(org_id) = &config.organization_id {
            openai_config = openai_config.with_org_id(org_id);
        }

        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        Ok(Self { client: Client::with_config(openai_config), config })
    }

    /// Create a client from `OPENAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIChatConfig::from_env()?)
    }

    /// Create a client for an OpenAI-compatible API.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        Self::new(OpenAIChatConfig::compatible(api_key, base_url, model))
    }

    pub fn config(&self) -> &OpenAIChatConfig {
        &self.config
    }

    fn request_error(message: String) -> ModelError {
        ModelError::Request { provider: PROVIDER.to_string(), message }
    }
}

#[async_trait]
impl TextGenerator for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, prompt_len = prompt.len(), "generating");

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| Self::request_error(format!("failed to build message: {e}")))?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.config.model).messages(vec![message.into()]);

        if let Some(temperature) = self.config.temperature {
            request_builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            request_builder.max_tokens(max_tokens);
        }

        let request = request_builder
            .build()
            .map_err(|e| Self::request_error(format!("failed to build request: {e}")))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "chat completion failed");
            Self::request_error(format!("API error: {e}"))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::EmptyResponse { provider: PROVIDER.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_the_model_id() {
        let model = OpenAIChatModel::new(OpenAIChatConfig::new("sk-test", "gpt-4o")).unwrap();
        assert_eq!(model.name(), "gpt-4o");
    }

    #[test]
    fn compatible_server_accepts_empty_key() {
        let model = OpenAIChatModel::compatible("", "http://localhost:8000/v1", "qwen2.5");
        assert!(model.is_ok());
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let result = OpenAIChatModel::new(OpenAIChatConfig::new("", "gpt-4o"));
        assert!(matches!(result, Err(ModelError::Config(_))));
    }
}
