use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing search and upload activity since start.
#[derive(Default)]
pub struct SearchMetrics {
    searches: AtomicU64,
    documents_scored: AtomicU64,
    summaries_generated: AtomicU64,
    model_failures: AtomicU64,
    uploads: AtomicU64,
}

impl SearchMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed search that scored `documents` documents.
    pub fn record_search(&self, documents: u64) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        self.documents_scored
            .fetch_add(documents, Ordering::Relaxed);
    }

    /// Record one model-written summary; fallbacks are counted as model failures instead.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a model call whose reply was unusable and was replaced by a default.
    pub fn record_model_failure(&self) {
        self.model_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a stored upload.
    pub fn record_upload(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            documents_scored: self.documents_scored.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            model_failures: self.model_failures.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of the counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Searches answered since startup.
    pub searches: u64,
    /// Documents sent to the relevance scorer across all searches.
    pub documents_scored: u64,
    /// Model-written summaries attached to returned results, excluding fallbacks.
    pub summaries_generated: u64,
    /// Scoring or summary calls that degraded to a default value.
    pub model_failures: u64,
    /// Files stored through the upload endpoint.
    pub uploads: u64,
}
