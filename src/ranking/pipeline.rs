use super::{Document, RelevanceScorer, ScoredDocument};

/// Score every document against `query`, one model call at a time, and order the survivors.
///
/// Documents scoring 0 are dropped. The sort is stable, so equal scores keep the order in which
/// `documents` were supplied. The result is not truncated.
pub async fn rank_documents(
    scorer: &RelevanceScorer,
    documents: Vec<Document>,
    query: &str,
) -> Vec<ScoredDocument> {
    let mut scored = Vec::with_capacity(documents.len());
    for Document { file, content } in documents {
        let score = scorer.score(&content, query).await;
        tracing::debug!(file = %file, score, "Scored document");
        if score > 0 {
            scored.push(ScoredDocument {
                file,
                content,
                score,
            });
        }
    }

    scored.sort_by(|left, right| right.score.cmp(&left.score));
    scored
}
