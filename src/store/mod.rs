//! Document storage: the set of uploaded files available to every search.
//!
//! [`FsDocumentStore`] is the production store over a flat directory. [`MemoryDocumentStore`]
//! holds already-extracted text and exists for isolated tests.

mod fs;
mod memory;

pub use fs::FsDocumentStore;
pub use memory::MemoryDocumentStore;

use crate::ranking::Document;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Supplied file name has no usable final component.
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    /// Blocking worker panicked or was cancelled.
    #[error("storage worker failed: {0}")]
    Task(String),
}

/// Collection of searchable documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return every stored document whose extracted text is not blank, ordered by file name.
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError>;

    /// Store `bytes` under `file_name`, replacing any previous file of that name.
    ///
    /// Returns the name the file was stored under.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

/// Reduce a client-supplied upload name to its final path component.
///
/// Returns `None` for names that are empty or consist only of directory syntax, such as `..`.
pub fn stored_file_name(raw: &str) -> Option<String> {
    // Clients on Windows send backslash-separated paths.
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let name = Path::new(last).file_name()?.to_str()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_kept() {
        assert_eq!(stored_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(
            stored_file_name("Q3 results.docx").as_deref(),
            Some("Q3 results.docx")
        );
    }

    #[test]
    fn directory_components_are_stripped() {
        assert_eq!(stored_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(
            stored_file_name(r"C:\Users\me\deck.pptx").as_deref(),
            Some("deck.pptx")
        );
    }

    #[test]
    fn empty_or_dot_names_are_rejected() {
        assert_eq!(stored_file_name(""), None);
        assert_eq!(stored_file_name("   "), None);
        assert_eq!(stored_file_name(".."), None);
        assert_eq!(stored_file_name("docs/"), None);
    }
}
