//! StudyAI Parser - Text extraction from uploaded documents
//!
//! Uploaded PDFs are written to a scratch path and handed to a
//! [`DocumentParser`], which yields one text segment per page. The
//! segments are later joined into a single prompt context.

use std::path::Path;
use thiserror::Error;

pub mod pdf;

pub use pdf::PdfParser;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during document parsing
#[derive(Error, Debug)]
pub enum ParserError {
    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// PDF parsing error
    #[error("PDF parsing error: {0}")]
    PdfError(String),

    /// Document parsed but yielded no text
    #[error("No extractable text in {0}")]
    EmptyDocument(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Parsed Document Types
// ============================================================================

/// A parsed document split into text segments
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Path the document was read from
    pub file_path: String,

    /// Detected file type
    pub file_type: FileType,

    /// Text segments in document order (one per page for PDFs)
    pub segments: Vec<String>,
}

impl ParsedDocument {
    /// Create a new parsed document
    pub fn new(file_path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            file_path: file_path.into(),
            file_type,
            segments: Vec::new(),
        }
    }

    /// Set segments
    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.segments = segments;
        self
    }

    /// All segments joined into one context string
    pub fn content(&self) -> String {
        self.segments.join("\n\n")
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Declared type of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from a declared content type.
    ///
    /// Only the media type essence is compared, so parameters such as
    /// `; charset=binary` are ignored.
    pub fn from_mime(content_type: &str) -> Self {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }
}

/// Whether a declared content type is `application/pdf`
pub fn is_pdf_content_type(content_type: &str) -> bool {
    FileType::from_mime(content_type) == FileType::Pdf
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Trait for document parsers
pub trait DocumentParser: Send + Sync {
    /// Parse a document from a file path
    fn parse(&self, path: &Path) -> Result<ParsedDocument>;
}

/// Collapse runs of blank lines and trailing whitespace in extracted text
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_from_mime() {
        assert_eq!(FileType::from_mime(" application/pdf ; name=a.pdf"), FileType::Pdf);
        assert_eq!(FileType::from_mime("application/pdfx"), FileType::Unknown);
        assert_eq!(FileType::from_mime("image/png"), FileType::Unknown);
    }

    #[test]
    fn test_pdf_content_type() {
        assert!(is_pdf_content_type("application/pdf"));
        assert!(is_pdf_content_type("Application/PDF"));
        assert!(is_pdf_content_type("application/pdf; charset=binary"));
        assert!(!is_pdf_content_type("text/plain"));
        assert!(!is_pdf_content_type("application/octet-stream"));
        assert!(!is_pdf_content_type(""));
    }

    #[test]
    fn test_document_content_joins_segments() {
        let doc = ParsedDocument::new("a.pdf", FileType::Pdf)
            .with_segments(vec!["first page".to_string(), "second page".to_string()]);

        assert_eq!(doc.content(), "first page\n\nsecond page");
        assert_eq!(doc.segment_count(), 2);
    }

    #[test]
    fn test_normalize_text() {
        let text = "Title   \n\n\n\nBody line\n   \n\nEnd\n";
        assert_eq!(normalize_text(text), "Title\n\nBody line\n\nEnd");
        assert_eq!(normalize_text("  \n \n"), "");
    }
}
