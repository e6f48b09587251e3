use super::{DocumentStore, StoreError, stored_file_name};
use crate::extraction::{DocumentKind, extract_text};
use crate::ranking::Document;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Identity of a file's contents as far as the text cache is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(metadata: &std::fs::Metadata) -> Self {
        Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }
}

#[derive(Debug)]
struct CachedText {
    fingerprint: Fingerprint,
    text: Arc<str>,
}

type TextCache = Arc<Mutex<HashMap<String, CachedText>>>;

const STAGING_PREFIX: &str = ".upload-";
const STAGING_SUFFIX: &str = ".part";

/// Name of the temporary file an upload is written to before it is renamed into place.
fn staging_file_name() -> String {
    format!("{STAGING_PREFIX}{}{STAGING_SUFFIX}", uuid::Uuid::new_v4())
}

fn is_staging_file(name: &str) -> bool {
    name.strip_prefix(STAGING_PREFIX)
        .and_then(|rest| rest.strip_suffix(STAGING_SUFFIX))
        .is_some_and(|id| uuid::Uuid::parse_str(id).is_ok())
}

/// Document store over a flat directory of uploaded files.
///
/// Extracted text is cached per file name and reused while the file's length and modification
/// time are unchanged. Scores are never cached.
pub struct FsDocumentStore {
    root: PathBuf,
    cache: TextCache,
}

impl FsDocumentStore {
    /// Open a store rooted at `root`, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "Document directory ready");
        Ok(Self {
            root,
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Directory holding the stored files.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let root = self.root.clone();
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || scan_directory(&root, &cache))
            .await
            .map_err(|error| StoreError::Task(error.to_string()))
    }

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let name =
            stored_file_name(file_name).ok_or_else(|| StoreError::InvalidName(file_name.into()))?;
        tokio::fs::create_dir_all(&self.root).await?;

        let staging = self.root.join(staging_file_name());
        tokio::fs::write(&staging, bytes).await?;
        if let Err(error) = tokio::fs::rename(&staging, self.root.join(&name)).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(error.into());
        }

        // Coarse mtime resolution can leave the fingerprint unchanged after a rewrite.
        lock(&self.cache).remove(&name);
        tracing::info!(file = %name, bytes = bytes.len(), "Stored document");
        Ok(name)
    }
}

fn lock(cache: &TextCache) -> std::sync::MutexGuard<'_, HashMap<String, CachedText>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

fn scan_directory(root: &Path, cache: &TextCache) -> Vec<Document> {
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "Document directory missing; nothing to search");
        return Vec::new();
    }

    let mut documents = Vec::new();
    let mut present = HashSet::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(error = %error, "Skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        if is_staging_file(&name) {
            continue;
        }

        let fingerprint = match entry.metadata() {
            Ok(metadata) => Fingerprint::of(&metadata),
            Err(error) => {
                tracing::warn!(file = %name, error = %error, "Skipping file without metadata");
                continue;
            }
        };
        present.insert(name.clone());

        let text = cached_or_extract(cache, &name, entry.path(), fingerprint);
        if text.trim().is_empty() {
            continue;
        }
        documents.push(Document {
            file: name,
            content: text.to_string(),
        });
    }

    lock(cache).retain(|name, _| present.contains(name));
    tracing::debug!(documents = documents.len(), "Loaded documents");
    documents
}

fn cached_or_extract(
    cache: &TextCache,
    name: &str,
    path: &Path,
    fingerprint: Fingerprint,
) -> Arc<str> {
    if let Some(cached) = lock(cache).get(name) {
        if cached.fingerprint == fingerprint {
            return Arc::clone(&cached.text);
        }
    }

    let text: Arc<str> = extract_text(path, DocumentKind::from_path(path)).into();
    lock(cache).insert(
        name.to_string(),
        CachedText {
            fingerprint,
            text: Arc::clone(&text),
        },
    );
    text
}
