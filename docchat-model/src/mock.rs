//! Mock text generator for tests and offline demos.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::generator::TextGenerator;

enum Behaviour {
    Reply(String),
    Fail(String),
}

/// A [`TextGenerator`] that returns a canned reply and remembers every prompt
/// it was given.
///
/// ```rust,ignore
/// let model = MockGenerator::new("The diagnosis is hypertension.");
/// model.generate("...").await?;
/// assert_eq!(model.calls(), 1);
/// ```
pub struct MockGenerator {
    name: String,
    behaviour: Behaviour,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Create a mock that always answers with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            behaviour: Behaviour::Reply(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose every call fails with a request error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            behaviour: Behaviour::Fail(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Override the reported model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// All prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// The most recent prompt, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    /// Number of calls made, including failed ones.
    pub fn calls(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.prompts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.lock().push(prompt.to_string());
        match &self.behaviour {
            Behaviour::Reply(reply) => Ok(reply.clone()),
            Behaviour::Fail(message) => {
                Err(ModelError::Request { provider: self.name.clone(), message: message.clone() })
            }
        }
    }
}
