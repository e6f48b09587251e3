use super::{ExtractionError, TextExtractor};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Extracts the text layer of a PDF. Image-only PDFs produce empty text.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path)?;
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&bytes)
        }))
        .map_err(|_| ExtractionError::Pdf("parser panicked".into()))?;

        outcome.map_err(|error| ExtractionError::Pdf(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"%PDF-garbage").expect("write");

        let error = PdfExtractor.extract(&path).expect_err("garbage pdf");
        assert!(matches!(error, ExtractionError::Pdf(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let error = PdfExtractor
            .extract(Path::new("/nonexistent/docsearch/file.pdf"))
            .expect_err("missing");
        assert!(matches!(error, ExtractionError::Io(_)));
    }
}
