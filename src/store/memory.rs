use super::{DocumentStore, StoreError, stored_file_name};
use crate::ranking::Document;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory store holding already-extracted text keyed by file name.
///
/// Uploaded bytes are decoded as UTF-8 (lossily) and used as the document text.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<String, String>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `(file, text)` pairs.
    pub fn with_documents<I, F, T>(documents: I) -> Self
    where
        I: IntoIterator<Item = (F, T)>,
        F: Into<String>,
        T: Into<String>,
    {
        Self {
            documents: RwLock::new(
                documents
                    .into_iter()
                    .map(|(file, text)| (file.into(), text.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(file, text)| Document {
                file: file.clone(),
                content: text.clone(),
            })
            .collect())
    }

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let name =
            stored_file_name(file_name).ok_or_else(|| StoreError::InvalidName(file_name.into()))?;
        self.documents
            .write()
            .await
            .insert(name.clone(), String::from_utf8_lossy(bytes).into_owned());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_documents_are_hidden() {
        let store = MemoryDocumentStore::with_documents([("b.pdf", "beta"), ("a.pdf", "  \n")]);
        let documents = store.list_documents().await.expect("list");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file, "b.pdf");
    }

    #[tokio::test]
    async fn saved_bytes_become_listed_text() {
        let store = MemoryDocumentStore::new();
        store.save("z.pdf", b"zeta").await.expect("save");
        store.save("y.pdf", b"upsilon").await.expect("save");
        let files: Vec<String> = store
            .list_documents()
            .await
            .expect("list")
            .into_iter()
            .map(|doc| doc.file)
            .collect();
        assert_eq!(files, ["y.pdf", "z.pdf"]);
    }
}
