//! Page chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedWindowChunker`],
//! which sweeps a fixed-size character window over each page with a smaller
//! stride so that text spanning a window boundary appears intact in at least
//! one chunk.

use crate::config::RagConfig;
use crate::document::{Chunk, ChunkMetadata, PageText};

/// A strategy for splitting extracted pages into chunks.
///
/// Implementations are pure: the same pages and source always produce the
/// same chunks, ids included.
pub trait Chunker: Send + Sync {
    /// Split the pages of one source document into chunks.
    ///
    /// Pages with empty or whitespace-only text yield no chunks.
    fn chunk(&self, pages: &[PageText], source_id: &str) -> Vec<Chunk>;
}

/// Splits each page into overlapping fixed-size character windows.
///
/// Window `i` of a page starts at character offset `i * stride` and spans
/// `window_size` characters. The sweep stops at the first window that reaches
/// the end of the page. Windows whose trimmed text is shorter than
/// `min_chars` are dropped.
///
/// Chunk IDs are `{source}_p{page}_c{offset / stride}`, with whitespace in the
/// source replaced by `_`. Each chunk's metadata carries the untouched source,
/// the page number and the document type tag.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{FixedWindowChunker, PageText};
///
/// let chunker = FixedWindowChunker::new(500, 400, 80);
/// let chunks = chunker.chunk(&[PageText::new(1, text)], "report.pdf");
/// ```
#[derive(Debug, Clone)]
pub struct FixedWindowChunker {
    window_size: usize,
    stride: usize,
    min_chars: usize,
    doc_type: String,
}

impl FixedWindowChunker {
    /// Create a new `FixedWindowChunker`.
    ///
    /// # Arguments
    ///
    /// * `window_size` - characters per window
    /// * `stride` - characters between window starts (a zero stride is treated as 1)
    /// * `min_chars` - minimum trimmed length for a window to be kept
    pub fn new(window_size: usize, stride: usize, min_chars: usize) -> Self {
        Self { window_size, stride: stride.max(1), min_chars, doc_type: "document".to_string() }
    }

    /// Build a chunker from the window settings and document type of a config.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.window_size, config.stride, config.min_chunk_chars)
            .with_document_type(config.document_type.clone())
    }

    /// Set the tag written to each chunk's `type` metadata.
    pub fn with_document_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Character offsets of every window over a page of `len` characters,
    /// before the minimum-content filter is applied.
    pub fn window_offsets(&self, len: usize) -> Vec<usize> {
        let mut offsets = Vec::new();
        let mut start = 0;
        while start < len {
            offsets.push(start);
            if start + self.window_size >= len {
                break;
            }
            start += self.stride;
        }
        offsets
    }

    fn chunk_page(&self, page: &PageText, source_id: &str, id_prefix: &str) -> Vec<Chunk> {
        let text = page.text.as_str();
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, so windows never split a
        // UTF-8 sequence.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = boundaries.len() - 1;

        self.window_offsets(len)
            .into_iter()
            .filter_map(|offset| {
                let end = (offset + self.window_size).min(len);
                let window = text[boundaries[offset]..boundaries[end]].trim();
                if window.is_empty() || window.chars().count() < self.min_chars {
                    return None;
                }
                let window_index = offset / self.stride;
                Some(Chunk {
                    id: format!("{id_prefix}_p{}_c{window_index}", page.number),
                    text: window.to_string(),
                    metadata: ChunkMetadata::new(source_id, page.number, self.doc_type.clone()),
                })
            })
            .collect()
    }
}

impl Default for FixedWindowChunker {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

impl Chunker for FixedWindowChunker {
    fn chunk(&self, pages: &[PageText], source_id: &str) -> Vec<Chunk> {
        let id_prefix = chunk_id_prefix(source_id);
        pages.iter().flat_map(|page| self.chunk_page(page, source_id, &id_prefix)).collect()
    }
}

/// The source id as used inside chunk ids: whitespace becomes `_`.
///
/// Sources that differ only there (`lab report.pdf`, `lab_report.pdf`) map
/// to the same ids. The stores refuse to let one source's entries replace
/// another's, so indexing the second one fails with `VectorStoreError`.
pub fn chunk_id_prefix(source_id: &str) -> String {
    source_id.chars().map(|c| if c.is_whitespace() { '_' } else { c }).collect()
}
