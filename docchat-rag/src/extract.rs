//! Turning raw document bytes into per-page text.
//!
//! Extraction is lenient: a page that cannot be read is returned with empty
//! text and an [`ExtractionDegraded`] record, so one bad page never sinks a
//! whole document. Only a document that cannot be opened at all is an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::PageText;
use crate::error::Result;

/// Non-fatal notice that part of a document was not extracted cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDegraded {
    /// The affected page, or `None` when the notice covers the whole document.
    pub page: Option<u32>,
    pub reason: String,
}

impl ExtractionDegraded {
    pub fn page(page: u32, reason: impl Into<String>) -> Self {
        Self { page: Some(page), reason: reason.into() }
    }

    pub fn document(reason: impl Into<String>) -> Self {
        Self { page: None, reason: reason.into() }
    }
}

impl fmt::Display for ExtractionDegraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "page {page}: {}", self.reason),
            None => write!(f, "document: {}", self.reason),
        }
    }
}

/// Pages extracted from one document plus any degradation notices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Pages in document order, numbered from 1.
    pub pages: Vec<PageText>,
    pub degraded: Vec<ExtractionDegraded>,
}

impl Extraction {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Extracts per-page text from document bytes.
pub trait TextExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`](crate::RagError::ExtractionError)
    /// when the document cannot be read at all.
    fn extract(&self, bytes: &[u8]) -> Result<Extraction>;
}

/// Treats the input as UTF-8 text with pages separated by form feeds
/// (`\x0c`), the convention `pdftotext` and most text exports follow.
///
/// Invalid UTF-8 is replaced rather than rejected and reported as a
/// document-level degradation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        let text = String::from_utf8_lossy(bytes);
        if std::str::from_utf8(bytes).is_err() {
            warn!("input is not valid UTF-8, invalid sequences replaced");
            extraction.degraded.push(ExtractionDegraded::document("invalid UTF-8 replaced"));
        }
        if text.is_empty() {
            return Ok(extraction);
        }

        let body = text.strip_suffix('\x0c').unwrap_or(&text);
        extraction.pages = body
            .split('\x0c')
            .zip(1u32..)
            .map(|(page, number)| PageText::new(number, page))
            .collect();

        debug!(pages = extraction.pages.len(), "extracted plain text");
        Ok(extraction)
    }
}

#[cfg(feature = "pdf")]
pub use pdf::PdfTextExtractor;

#[cfg(feature = "pdf")]
mod pdf {
    use tracing::{debug, error, warn};

    use super::{Extraction, ExtractionDegraded, TextExtractor};
    use crate::document::PageText;
    use crate::error::{RagError, Result};

    /// Extracts the text layer of a PDF with [`lopdf`].
    ///
    /// Scanned pages without a text layer come back empty; no OCR is
    /// attempted.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PdfTextExtractor;

    impl PdfTextExtractor {
        pub fn new() -> Self {
            Self
        }
    }

    impl TextExtractor for PdfTextExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<Extraction> {
            let document = lopdf::Document::load_mem(bytes).map_err(|e| {
                error!(error = %e, "failed to load PDF");
                RagError::ExtractionError(format!("failed to load PDF: {e}"))
            })?;

            let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
            debug!(page_count = page_numbers.len(), "extracting text from PDF");

            let mut extraction = Extraction::default();
            for number in page_numbers {
                let text = match document.extract_text(&[number]) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(page = number, error = %e, "failed to extract page text");
                        extraction.degraded.push(ExtractionDegraded::page(number, e.to_string()));
                        String::new()
                    }
                };
                extraction.pages.push(PageText::new(number, text));
            }
            Ok(extraction)
        }
    }
}
