// src/matching/embedding.rs
// Semantic fallback for descriptions the lexical path cannot resolve. The
// query text is encoded under a hard timeout, compared against precomputed
// directory embeddings by cosine similarity, and only users at or above the
// acceptance threshold come back. Encoder failure or timeout degrades to an
// empty result, never an error.

use std::time::Duration;

use log::warn;
use tokio::time::timeout;

use crate::config::MatcherConfig;
use crate::embedder::Embedder;
use crate::models::core::PreparedUser;
use crate::models::matching::{MatchMethodType, ScoredMatch};
use crate::utils::candle::cosine_similarity_candle;

/// Encode under a timeout; failure and timeout both degrade to an empty
/// vector so the caller can skip the semantic path.
pub async fn embed_with_timeout<E: Embedder>(
    embedder: &E,
    text: &str,
    limit: Duration,
) -> Vec<f32> {
    match timeout(limit, embedder.encode(text)).await {
        Ok(Ok(vector)) => vector,
        Ok(Err(e)) => {
            warn!("Embedding failed for query text: {e:#}");
            Vec::new()
        }
        Err(_) => {
            warn!("Embedding timed out after {limit:?}");
            Vec::new()
        }
    }
}

/// Cosine similarity mapped onto the shared 0-100 score scale.
pub fn scaled_score(cosine: f64) -> f64 {
    cosine.clamp(0.0, 1.0) * 100.0
}

pub fn passes_threshold(cosine: f64, accept: f64) -> bool {
    cosine >= accept
}

/// Score the whole directory against one query text. Users without a
/// precomputed embedding are skipped.
pub async fn score_directory<E: Embedder>(
    config: &MatcherConfig,
    embedder: &E,
    users: &[PreparedUser],
    query: &str,
) -> Vec<ScoredMatch> {
    let query_vector = embed_with_timeout(embedder, query, config.embedding_timeout).await;
    if query_vector.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (user_index, user) in users.iter().enumerate() {
        let user_vector = match &user.embedding {
            Some(vector) => vector,
            None => continue,
        };
        let cosine = cosine_similarity_candle(&query_vector, user_vector).unwrap_or_else(|e| {
            warn!("Cosine similarity failed for user {}: {e:#}", user.id);
            0.0
        });
        if !passes_threshold(cosine, config.embedding_accept) {
            continue;
        }
        let score = scaled_score(cosine);
        matches.push(ScoredMatch {
            user_index,
            user_id: user.id.clone(),
            score,
            base_score: score,
            method: MatchMethodType::Embedding,
            adjustments: Vec::new(),
            variant: query.to_string(),
            is_secondary_mention: false,
        });
    }
    matches
}
