/// Extracted text of one stored file, built fresh for each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name inside the document directory.
    pub file: String,
    /// Extracted text; never blank.
    pub content: String,
}

/// Document paired with the relevance score the model assigned for the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredDocument {
    /// File name inside the document directory.
    pub file: String,
    /// Extracted text.
    pub content: String,
    /// Relevance in `0..=100`.
    pub score: u8,
}

/// Externally visible search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedResult {
    /// File name inside the document directory.
    pub file: String,
    /// Relevance in `1..=100`.
    pub score: u8,
    /// Query-conditioned summary, or [`super::FALLBACK_SUMMARY`].
    pub summary: String,
    /// Extracted text, echoed back in the HTTP payload.
    pub content: String,
}
