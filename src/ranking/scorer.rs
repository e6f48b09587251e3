use super::leading_chars;
use crate::chat::ChatClient;
use crate::metrics::SearchMetrics;
use std::sync::Arc;

/// Characters of document text shown to the model when scoring.
pub const SCORE_CONTEXT_CHARS: usize = 1000;

/// Obtains a 0 to 100 relevance judgment for a document from the language model.
pub struct RelevanceScorer {
    client: Arc<dyn ChatClient>,
    metrics: Arc<SearchMetrics>,
}

impl RelevanceScorer {
    /// Build a scorer issuing requests through `client`.
    pub fn new(client: Arc<dyn ChatClient>, metrics: Arc<SearchMetrics>) -> Self {
        Self { client, metrics }
    }

    /// Score `text` against `query`. Transport failures and unparsable replies score 0.
    pub async fn score(&self, text: &str, query: &str) -> u8 {
        let prompt = build_score_prompt(text, query);
        let reply = match self.client.chat(&prompt).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(error = %error, "Relevance request failed; scoring 0");
                self.metrics.record_model_failure();
                return 0;
            }
        };

        parse_score(&reply).unwrap_or_else(|| {
            tracing::warn!(reply = %reply.trim(), "Relevance reply was not a score; scoring 0");
            self.metrics.record_model_failure();
            0
        })
    }
}

/// Prompt asking for a bare integer score, over the first [`SCORE_CONTEXT_CHARS`] characters.
pub fn build_score_prompt(text: &str, query: &str) -> String {
    format!(
        "Rate how relevant the following text is to this query: {query}. Provide ONLY a score from 0 to 100.\n\nText: {}",
        leading_chars(text, SCORE_CONTEXT_CHARS)
    )
}

/// Parse a model reply as a score. Anything but a single integer in `0..=100` is rejected.
pub fn parse_score(reply: &str) -> Option<u8> {
    let value: i64 = reply.trim().parse().ok()?;
    u8::try_from(value).ok().filter(|score| *score <= 100)
}
