//! # docchat-rag
//!
//! Chat with a document: split its pages into overlapping chunks, embed and
//! index them, retrieve the chunks closest to a question, and have a text
//! generator answer from those chunks alone.
//!
//! ## Overview
//!
//! The crate is organised around a few seams:
//!
//! - [`Chunker`] - splits extracted pages into [`Chunk`]s ([`FixedWindowChunker`])
//! - [`EmbeddingProvider`] - turns text into vectors
//! - [`VectorStore`] - stores and searches vectors ([`InMemoryVectorStore`],
//!   [`LocalVectorStore`], and Qdrant behind the `qdrant` feature)
//! - [`TextExtractor`] - turns document bytes into pages ([`PlainTextExtractor`],
//!   and a PDF extractor behind the `pdf` feature)
//! - [`TextGenerator`](docchat_model::TextGenerator) - produces the answer
//!
//! [`Indexer`], [`Retriever`] and [`Answerer`] each do one step;
//! [`DocumentChat`] drives all of them for a [`ChatSession`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_rag::{ChatSession, DocumentChat, LocalVectorStore, RagConfig};
//!
//! let chat = DocumentChat::builder()
//!     .config(RagConfig::builder().document_type("medical_report").build()?)
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .vector_store(Arc::new(LocalVectorStore::open("./docchat_index").await?))
//!     .generator(Arc::new(OpenAIChatModel::from_env()?))
//!     .build()?;
//! chat.open_collection().await?;
//!
//! let mut session = ChatSession::new();
//! chat.index_document(&mut session, "report.pdf", &std::fs::read("report.pdf")?).await?;
//! let turn = chat.ask(&mut session, "What is the diagnosis?").await?;
//! println!("{}", turn.answer);
//! ```
//!
//! ## Features
//!
//! - `openai` - OpenAI embeddings and chat completions
//! - `qdrant` - Qdrant vector store
//! - `pdf` - PDF text extraction
//! - `full` - all of the above

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod filter;
pub mod indexer;
pub mod inmemory;
pub mod local;
pub mod pipeline;
pub mod retriever;
pub mod session;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use answer::{ANSWER_INSTRUCTIONS, Answerer, NO_CONTEXT_MARKER, build_prompt};
pub use chunking::{Chunker, FixedWindowChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, ChunkMetadata, IndexedEntry, PageText, QueryResult, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use extract::{Extraction, ExtractionDegraded, PlainTextExtractor, TextExtractor};
pub use filter::{MetadataField, MetadataFilter, MetadataValue};
pub use indexer::Indexer;
pub use inmemory::InMemoryVectorStore;
pub use local::LocalVectorStore;
pub use pipeline::{ChatTurn, DocumentChat, DocumentChatBuilder, IndexReport};
pub use retriever::Retriever;
pub use session::{ActiveDocument, ChatMessage, ChatSession, Role, SourceRef};
pub use vectorstore::VectorStore;

#[cfg(feature = "pdf")]
pub use extract::PdfTextExtractor;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingProvider;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
