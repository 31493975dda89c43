//! PDF document parser using pdf-extract
//!
//! Extracts text content from PDF files and splits it into one
//! segment per page.

use std::path::Path;

use crate::{normalize_text, DocumentParser, FileType, ParsedDocument, ParserError, Result};

/// Page separator emitted by pdf-extract
const PAGE_BREAK: char = '\x0C';

/// PDF document parser. Pages without text are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser
    pub fn new() -> Self {
        Self
    }

    /// Extract page segments from in-memory PDF bytes
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ParserError::PdfError(e.to_string()))?;

        Ok(split_pages(&text))
    }
}

/// Split extracted text on page breaks, dropping empty pages
fn split_pages(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK)
        .map(normalize_text)
        .filter(|page| !page.is_empty())
        .collect()
}

impl DocumentParser for PdfParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let bytes = std::fs::read(path).map_err(|e| ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let segments = self.parse_bytes(&bytes)?;
        if segments.is_empty() {
            return Err(ParserError::EmptyDocument(path.display().to_string()));
        }

        Ok(ParsedDocument::new(path.display().to_string(), FileType::Pdf).with_segments(segments))
    }
}
