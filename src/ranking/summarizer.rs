use super::leading_chars;
use crate::chat::ChatClient;
use crate::metrics::SearchMetrics;
use std::sync::Arc;

/// Characters of document text shown to the model when summarizing.
pub const SUMMARY_CONTEXT_CHARS: usize = 2000;

/// Summary returned when the model gives nothing usable.
pub const FALLBACK_SUMMARY: &str = "Summary not available.";

/// Produces query-conditioned summaries for returned results.
pub struct Summarizer {
    client: Arc<dyn ChatClient>,
    metrics: Arc<SearchMetrics>,
}

impl Summarizer {
    /// Build a summarizer issuing requests through `client`.
    pub fn new(client: Arc<dyn ChatClient>, metrics: Arc<SearchMetrics>) -> Self {
        Self { client, metrics }
    }

    /// Summarize `text` as it relates to `query`, or return [`FALLBACK_SUMMARY`].
    pub async fn summarize(&self, text: &str, query: &str) -> String {
        let prompt = build_summary_prompt(text, query);
        match self.client.chat(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => {
                self.metrics.record_summary();
                reply.trim().to_string()
            }
            Ok(_) => {
                tracing::warn!("Summary reply was empty; using fallback");
                self.metrics.record_model_failure();
                FALLBACK_SUMMARY.to_string()
            }
            Err(error) => {
                tracing::warn!(error = %error, "Summary request failed; using fallback");
                self.metrics.record_model_failure();
                FALLBACK_SUMMARY.to_string()
            }
        }
    }
}

/// Summary prompt over the first [`SUMMARY_CONTEXT_CHARS`] characters of `text`.
pub fn build_summary_prompt(text: &str, query: &str) -> String {
    format!(
        "Summarize the following document based on how it relates to the query: {query}\n\nText: {}",
        leading_chars(text, SUMMARY_CONTEXT_CHARS)
    )
}
