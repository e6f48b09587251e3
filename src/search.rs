//! Search service coordinating the document store, ranking, and summarization.

use crate::{
    chat::ChatClient,
    metrics::{MetricsSnapshot, SearchMetrics},
    ranking::{RankedResult, RelevanceScorer, Summarizer, rank_documents},
    store::{DocumentStore, StoreError, stored_file_name},
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Maximum number of results returned (and summarized) per search.
pub const RESULT_LIMIT: usize = 5;

/// Errors emitted while answering a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query was empty after trimming.
    #[error("Query cannot be empty")]
    EmptyQuery,
    /// Document store could not be read.
    #[error("Failed to load documents: {0}")]
    Store(#[from] StoreError),
}

/// Errors emitted while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Upload carried no usable file name.
    #[error("No selected file")]
    EmptyFileName,
    /// Document store rejected the write.
    #[error("Failed to store file: {0}")]
    Store(#[from] StoreError),
}

/// Abstraction over the search pipeline used by the HTTP surface.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Rank stored documents against `query` and summarize the top results.
    async fn search(&self, query: &str) -> Result<Vec<RankedResult>, SearchError>;

    /// Store an uploaded file and return the name it was stored under.
    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Answers searches over an injected document store using an injected chat client.
///
/// Each search lists the store, scores every document sequentially, and summarizes at most
/// [`RESULT_LIMIT`] results. Nothing is retained between searches besides metrics.
pub struct SearchService {
    store: Arc<dyn DocumentStore>,
    scorer: RelevanceScorer,
    summarizer: Summarizer,
    metrics: Arc<SearchMetrics>,
}

impl SearchService {
    /// Build a service over `store`, sending every model call through `client`.
    pub fn new(store: Arc<dyn DocumentStore>, client: Arc<dyn ChatClient>) -> Self {
        let metrics = Arc::new(SearchMetrics::new());
        Self {
            store,
            scorer: RelevanceScorer::new(Arc::clone(&client), Arc::clone(&metrics)),
            summarizer: Summarizer::new(client, Arc::clone(&metrics)),
            metrics,
        }
    }

    /// Validate `query`, rank all stored documents, and attach summaries to the top results.
    pub async fn search(&self, query: &str) -> Result<Vec<RankedResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let documents = self.store.list_documents().await?;
        let document_count = documents.len();
        tracing::info!(
            query_len = query.chars().count(),
            documents = document_count,
            "Ranking documents"
        );

        let mut ranked = rank_documents(&self.scorer, documents, query).await;
        ranked.truncate(RESULT_LIMIT);

        let mut results = Vec::with_capacity(ranked.len());
        for scored in ranked {
            let summary = self.summarizer.summarize(&scored.content, query).await;
            results.push(RankedResult {
                file: scored.file,
                score: scored.score,
                summary,
                content: scored.content,
            });
        }

        self.metrics.record_search(document_count as u64);
        tracing::info!(
            documents = document_count,
            results = results.len(),
            "Search completed"
        );
        Ok(results)
    }

    /// Store an upload under the final component of `file_name`.
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let name = stored_file_name(file_name).ok_or(UploadError::EmptyFileName)?;
        let stored = self.store.save(&name, bytes).await?;
        self.metrics.record_upload();
        Ok(stored)
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl SearchApi for SearchService {
    async fn search(&self, query: &str) -> Result<Vec<RankedResult>, SearchError> {
        SearchService::search(self, query).await
    }

    async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        SearchService::upload(self, file_name, bytes).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SearchService::metrics_snapshot(self)
    }
}
