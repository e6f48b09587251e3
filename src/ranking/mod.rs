//! Relevance ranking and summarization.
//!
//! Every document is judged by the language model against the query, zero scores are dropped,
//! and survivors are ordered by score. Summaries are produced separately for the few results
//! that are actually returned.

mod pipeline;
mod scorer;
mod summarizer;
mod types;

pub use pipeline::rank_documents;
pub use scorer::{RelevanceScorer, SCORE_CONTEXT_CHARS, build_score_prompt, parse_score};
pub use summarizer::{FALLBACK_SUMMARY, SUMMARY_CONTEXT_CHARS, Summarizer, build_summary_prompt};
pub use types::{Document, RankedResult, ScoredDocument};

/// Longest prefix of `text` holding at most `limit` characters.
pub(crate) fn leading_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::leading_chars;

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(leading_chars("héllo", 2), "hé");
        assert_eq!(leading_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(leading_chars("abc", 10), "abc");
        assert_eq!(leading_chars("abc", 3), "abc");
        assert_eq!(leading_chars("", 5), "");
    }
}
