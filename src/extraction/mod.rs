//! Plain-text extraction for uploaded documents.
//!
//! Each supported format has its own [`TextExtractor`]. [`extract_text`] is the boundary used by
//! the document store: it never fails, logging parse errors and returning an empty string.

mod ooxml;
mod pdf;

pub use ooxml::{DocxExtractor, PptxExtractor};
pub use pdf::PdfExtractor;

use std::path::Path;
use thiserror::Error;

/// Errors raised while pulling text out of a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// File could not be read from disk.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    /// Office container was not a readable zip archive.
    #[error("invalid office archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    /// Office part contained malformed XML.
    #[error("malformed document XML: {0}")]
    Xml(String),
    /// PDF parser rejected the file.
    #[error("failed to parse PDF: {0}")]
    Pdf(String),
}

/// Document formats the search assistant knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Word Open XML document.
    Docx,
    /// PowerPoint Open XML presentation.
    Pptx,
}

impl DocumentKind {
    /// Infer the kind from a file extension, ignoring case. Unknown extensions yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Extractor responsible for this format.
    pub fn extractor(self) -> &'static dyn TextExtractor {
        match self {
            Self::Pdf => &PdfExtractor,
            Self::Docx => &DocxExtractor,
            Self::Pptx => &PptxExtractor,
        }
    }
}

/// Format-specific text extraction.
pub trait TextExtractor: Send + Sync {
    /// Read the file at `path` and return its text content.
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Extract text from `path`, treating unsupported kinds and every failure as empty text.
pub fn extract_text(path: &Path, kind: Option<DocumentKind>) -> String {
    let Some(kind) = kind else {
        tracing::debug!(file = %path.display(), "Skipping unsupported file type");
        return String::new();
    };

    match kind.extractor().extract(path) {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!(file = %path.display(), ?kind, error = %error, "Text extraction failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_inferred_case_insensitively() {
        assert_eq!(
            DocumentKind::from_path(Path::new("Report.PDF")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("notes.docx")),
            Some(DocumentKind::Docx)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("deck.pptx")),
            Some(DocumentKind::Pptx)
        );
        assert_eq!(DocumentKind::from_path(Path::new("readme.txt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn unsupported_kind_yields_empty_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, "real words").expect("write");
        assert_eq!(extract_text(&path, DocumentKind::from_path(&path)), "");
    }

    #[test]
    fn corrupt_files_yield_empty_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["broken.pdf", "broken.docx", "broken.pptx"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"definitely not a document").expect("write");
            assert_eq!(extract_text(&path, DocumentKind::from_path(&path)), "", "{name}");
        }
    }

    #[test]
    fn missing_file_yields_empty_text() {
        let path = Path::new("/nonexistent/docsearch/missing.docx");
        assert_eq!(extract_text(path, Some(DocumentKind::Docx)), "");
    }
}
