//! # docchat-model
//!
//! Text-generation model integrations for docchat.
//!
//! ## Overview
//!
//! The answer step of the document chat pipeline hands a fully assembled
//! prompt to a [`TextGenerator`] and takes its reply verbatim. This crate
//! provides that trait plus:
//!
//! - [`OpenAIChatModel`] - OpenAI chat completions and OpenAI-compatible APIs
//!   (Ollama, vLLM, LM Studio, etc.), behind the `openai` feature
//! - [`MockGenerator`] - canned replies and prompt capture for testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docchat_model::openai::{OpenAIChatModel, OpenAIChatConfig};
//! use docchat_model::TextGenerator;
//!
//! let model = OpenAIChatModel::new(OpenAIChatConfig::new(
//!     std::env::var("OPENAI_API_KEY")?,
//!     "gpt-4o-mini",
//! ))?;
//! let reply = model.generate("Summarise the report.").await?;
//! ```
//!
//! ## Supported Models
//!
//! ### OpenAI
//! | Model | Description |
//! |-------|-------------|
//! | `gpt-4o` | Most capable model |
//! | `gpt-4o-mini` | Fast, cost-effective (default) |
//!
//! Responses are never streamed and requests are never retried; a failed
//! call surfaces as a [`ModelError`].

pub mod error;
pub mod generator;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use error::{ModelError, Result};
pub use generator::TextGenerator;
pub use mock::MockGenerator;
#[cfg(feature = "openai")]
pub use openai::{OpenAIChatConfig, OpenAIChatModel};
