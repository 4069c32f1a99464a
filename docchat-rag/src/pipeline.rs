//! Document chat orchestrator.
//!
//! [`DocumentChat`] wires extraction, chunking, indexing, retrieval and
//! answering together and keeps a [`ChatSession`] up to date as the user
//! uploads a document and asks about it.
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_rag::{ChatSession, DocumentChat, InMemoryVectorStore, RagConfig};
//!
//! let chat = DocumentChat::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .generator(Arc::new(my_model))
//!     .build()?;
//!
//! chat.open_collection().await?;
//! let mut session = ChatSession::new();
//! chat.index_document(&mut session, "report.pdf", &bytes).await?;
//! let turn = chat.ask(&mut session, "What is the diagnosis?").await?;
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use docchat_model::TextGenerator;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::answer::Answerer;
use crate::chunking::{Chunker, FixedWindowChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, PageText};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::extract::{ExtractionDegraded, TextExtractor};
use crate::filter::MetadataFilter;
use crate::indexer::Indexer;
use crate::retriever::Retriever;
use crate::session::{ActiveDocument, ChatMessage, ChatSession, SourceRef};
use crate::vectorstore::VectorStore;

/// Outcome of indexing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub source: String,
    pub chunk_count: usize,
    /// Pages handed to the chunker, including pages without text.
    pub page_count: usize,
    /// Pages (or the whole document) that did not extract cleanly.
    pub degraded: Vec<ExtractionDegraded>,
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub question: String,
    pub answer: String,
    /// Retrieved chunks the answer was grounded on, most similar first.
    pub sources: Vec<SourceRef>,
}

/// Chat with a document: index it, then answer questions from it.
///
/// Construct one via [`DocumentChat::builder()`]. A `DocumentChat` holds no
/// per-user state and can serve many [`ChatSession`]s.
pub struct DocumentChat {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn Chunker>,
    indexer: Indexer,
    retriever: Retriever,
    answerer: Answerer,
}

impl DocumentChat {
    /// Create a new [`DocumentChatBuilder`].
    pub fn builder() -> DocumentChatBuilder {
        DocumentChatBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn answerer(&self) -> &Answerer {
        &self.answerer
    }

    /// Open the configured collection, creating it when missing.
    ///
    /// The collection is created with the dimensionality reported by the
    /// configured [`EmbeddingProvider`].
    pub async fn open_collection(&self) -> Result<()> {
        let collection = &self.config.collection;
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(collection, dimensions).await.map_err(|e| {
            error!(collection = %collection, error = %e, "failed to open collection");
            e
        })
    }

    /// Extract, chunk and index a document, then make it the session's
    /// active document.
    ///
    /// Any previous entries for `source` are replaced. Pages that failed to
    /// extract are listed in the report rather than failing the call.
    pub async fn index_document(
        &self,
        session: &mut ChatSession,
        source: &str,
        bytes: &[u8],
    ) -> Result<IndexReport> {
        let extraction = self.extractor.extract(bytes)?;
        for notice in &extraction.degraded {
            warn!(source, %notice, "degraded extraction");
        }

        let mut report = self.index_pages(session, source, &extraction.pages).await?;
        report.degraded = extraction.degraded;
        Ok(report)
    }

    /// Chunk and index already-extracted pages.
    ///
    /// The session is only switched to `source` when at least one chunk was
    /// stored; otherwise the source is cleared from the collection and the
    /// report shows zero chunks. A session already pointing at `source` is
    /// reset in that case, since its entries are gone.
    pub async fn index_pages(
        &self,
        session: &mut ChatSession,
        source: &str,
        pages: &[PageText],
    ) -> Result<IndexReport> {
        let chunks = self.chunker.chunk(pages, source);
        let chunk_count = self.indexer.index(&chunks, source).await?;

        if chunk_count > 0 {
            let indexed_pages: BTreeSet<u32> = chunks.iter().map(|c| c.page()).collect();
            session.set_document(ActiveDocument {
                source: source.to_string(),
                chunk_count,
                page_count: indexed_pages.len(),
            });
        } else {
            warn!(source, pages = pages.len(), "document produced no chunks");
            if session.source() == Some(source) {
                session.clear_document();
            }
        }

        Ok(IndexReport {
            source: source.to_string(),
            chunk_count,
            page_count: pages.len(),
            degraded: Vec::new(),
        })
    }

    /// Answer a question about the session's active document.
    ///
    /// The question is logged before retrieval; on failure it stays in the
    /// log and the error is returned. Retrieval is narrowed to the active
    /// document when there is one.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidArgument`] for a blank question (nothing is logged).
    /// - [`RagError::EmptyCollection`] when nothing has been indexed yet.
    /// - Embedding, store and generation errors from the components.
    pub async fn ask(&self, session: &mut ChatSession, question: &str) -> Result<ChatTurn> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidArgument("question must not be empty".to_string()));
        }
        session.push(ChatMessage::user(question));

        let filter = session.source().map(MetadataFilter::source);
        let results =
            self.retriever.retrieve_filtered(question, self.config.top_k, filter.as_ref()).await?;

        let context: Vec<Chunk> = results.iter().map(|r| r.chunk.clone()).collect();
        let answer = self.answerer.answer(question, &context).await?;
        let sources: Vec<SourceRef> = results.iter().map(SourceRef::from_result).collect();

        session.push(ChatMessage::assistant(answer.clone(), sources.clone()));
        info!(
            session = %session.id(),
            source = session.source().unwrap_or_default(),
            context_chunks = context.len(),
            "answered question"
        );

        Ok(ChatTurn { question: question.to_string(), answer, sources })
    }
}

/// Builder for constructing a [`DocumentChat`].
///
/// The embedding provider, vector store and generator are required. The
/// config defaults to [`RagConfig::default()`], the chunker to a
/// [`FixedWindowChunker`] built from the config, and the extractor to the
/// PDF extractor when the `pdf` feature is enabled and to
/// [`PlainTextExtractor`](crate::PlainTextExtractor) otherwise.
#[derive(Default)]
pub struct DocumentChatBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn TextGenerator>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl DocumentChatBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used for both indexing and queries.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`DocumentChat`], validating the config and that all
    /// required components are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required component is missing
    /// or the config is invalid.
    pub fn build(self) -> Result<DocumentChat> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;
        let extractor = self.extractor.unwrap_or_else(default_extractor);
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(FixedWindowChunker::from_config(&config)));

        let indexer =
            Indexer::new(embedding_provider.clone(), vector_store.clone(), config.collection.clone());
        let retriever =
            Retriever::new(embedding_provider.clone(), vector_store.clone(), config.collection.clone());

        Ok(DocumentChat {
            config,
            embedding_provider,
            vector_store,
            extractor,
            chunker,
            indexer,
            retriever,
            answerer: Answerer::new(generator),
        })
    }
}

#[cfg(feature = "pdf")]
fn default_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(crate::extract::PdfTextExtractor::new())
}

#[cfg(not(feature = "pdf"))]
fn default_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(crate::extract::PlainTextExtractor::new())
}
