//! Grounded answer generation.
//!
//! [`build_prompt`] turns a question and its retrieved chunks into a single
//! prompt; [`Answerer`] sends it to a [`TextGenerator`] and returns the raw
//! output.

use std::fmt::Write as _;
use std::sync::Arc;

use docchat_model::TextGenerator;
use tracing::{debug, error};

use crate::document::Chunk;
use crate::error::Result;

/// Stands in for the context section when retrieval found nothing.
pub const NO_CONTEXT_MARKER: &str = "NO CONTEXT FOUND";

/// Instruction placed at the top of every prompt.
pub const ANSWER_INSTRUCTIONS: &str = "You are a careful assistant answering questions about a \
document. Answer only from the provided context. If the answer is not in the context, say that \
the document does not contain it. Cite the page numbers you relied on.";

/// Assemble the prompt for `query` grounded on `context`.
///
/// Chunks appear in the given order, each prefixed with
/// `[source: <source>, page <n>]`. An empty context is replaced by
/// [`NO_CONTEXT_MARKER`].
pub fn build_prompt(query: &str, context: &[Chunk]) -> String {
    let mut prompt = String::from(ANSWER_INSTRUCTIONS);
    prompt.push_str("\n\nContext:\n");

    if context.is_empty() {
        prompt.push_str(NO_CONTEXT_MARKER);
        prompt.push('\n');
    } else {
        for (i, chunk) in context.iter().enumerate() {
            if i > 0 {
                prompt.push('\n');
            }
            let _ = writeln!(prompt, "[source: {}, page {}]", chunk.source(), chunk.page());
            prompt.push_str(&chunk.text);
            prompt.push('\n');
        }
    }

    let _ = write!(prompt, "\nQuestion: {query}\n\nAnswer:");
    prompt
}

/// Produces answers grounded on retrieved chunks.
pub struct Answerer {
    generator: Arc<dyn TextGenerator>,
}

impl Answerer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    /// Generate an answer to `query` from `context`.
    ///
    /// The generator is called even when `context` is empty; the prompt then
    /// tells it no context was found. The reply is returned unmodified.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationError`](crate::RagError::GenerationError)
    /// if the generator fails. There are no retries.
    pub async fn answer(&self, query: &str, context: &[Chunk]) -> Result<String> {
        let prompt = build_prompt(query, context);
        debug!(
            generator = self.generator.name(),
            context_chunks = context.len(),
            prompt_len = prompt.len(),
            "generating answer"
        );

        self.generator.generate(&prompt).await.map_err(|e| {
            error!(generator = self.generator.name(), error = %e, "answer generation failed");
            e.into()
        })
    }
}
