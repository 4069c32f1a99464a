//! The text-generation provider trait.

use async_trait::async_trait;

use crate::error::Result;

/// A hosted (or local) language model that turns a prompt into text.
///
/// Implementations perform exactly one provider call per
/// [`generate`](TextGenerator::generate) and return the model output
/// unmodified. No streaming interface is exposed.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_model::{MockGenerator, TextGenerator};
///
/// let model = MockGenerator::new("42");
/// assert_eq!(model.generate("What is the answer?").await?, "42");
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
