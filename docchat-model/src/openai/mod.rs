//! OpenAI chat completions and OpenAI-compatible endpoints.
//!
//! Only available with the `openai` feature.

mod client;
mod config;

pub use client::OpenAIChatModel;
pub use config::{DEFAULT_MODEL, OpenAIChatConfig};
