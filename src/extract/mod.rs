//! PDF text extraction seam.
//!
//! Extraction is an external concern as far as the pipeline cares: given raw
//! bytes it yields per-page text and a page count. The [`TextExtractor`] trait
//! keeps the orchestrator testable with a stub; [`PdfExtractor`] is the
//! lopdf-backed implementation wired up in production.

use thiserror::Error;

/// Magic prefix carried by every PDF file.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Errors raised while extracting text from a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document could not be parsed.
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
}

/// Text and page count recovered from one document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Concatenated text of all pages.
    pub text: String,
    /// Number of pages in the document.
    pub pages: usize,
}

/// Interface implemented by document text extractors.
pub trait TextExtractor: Send + Sync {
    /// Extract text and page count from raw document bytes.
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError>;
}

/// Check whether the payload looks like a PDF document.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// PDF text extractor backed by `lopdf`.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Construct a new extractor instance.
    pub const fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument, ExtractionError> {
        let document = lopdf::Document::load_mem(bytes)?;
        let pages: Vec<u32> = document.get_pages().keys().copied().collect();
        let page_count = pages.len();

        let mut text = String::new();
        for page_number in pages {
            let page_text = document.extract_text(&[page_number])?;
            if !text.is_empty() && !page_text.is_empty() {
                text.push('\n');
            }
            text.push_str(&page_text);
        }

        tracing::debug!(pages = page_count, characters = text.len(), "Extracted PDF text");
        Ok(ExtractedDocument {
            text,
            pages: page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_is_recognized() {
        assert!(is_pdf(b"%PDF-1.7\n..."));
        assert!(!is_pdf(b"PK\x03\x04 zip archive"));
        assert!(!is_pdf(b""));
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let result = PdfExtractor::new().extract(b"%PDF-1.7 not actually a pdf");
        assert!(matches!(result, Err(ExtractionError::Parse(_))));
    }
}
