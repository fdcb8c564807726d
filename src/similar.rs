// src/similar.rs
// Embedding index over a transaction set. Built once at startup, then serves
// "transactions most similar to this one" lookups by cosine similarity over
// the precomputed description embeddings.

use anyhow::{bail, Result};
use futures::future::try_join_all;
use log::{info, warn};
use serde::Serialize;

use crate::embedder::Embedder;
use crate::models::core::Transaction;
use crate::preprocessing::text_cleaner::hard_clean;
use crate::utils::candle::cosine_similarity_candle;

#[derive(Debug, Clone, Serialize)]
pub struct SimilarTransaction {
    pub id: String,
    pub description: String,
    /// Cosine similarity on a 0-1 scale, rounded to four decimals.
    pub similarity: f64,
    pub token_count: usize,
}

struct IndexedTransaction {
    transaction: Transaction,
    embedding: Vec<f32>,
    token_count: usize,
}

pub struct TransactionIndex {
    entries: Vec<IndexedTransaction>,
}

impl TransactionIndex {
    /// Embed every transaction description up front. Encoder failure during
    /// the build is fatal; lookups afterwards never suspend.
    pub async fn build<E: Embedder>(embedder: &E, transactions: Vec<Transaction>) -> Result<Self> {
        let normalized: Vec<String> = transactions
            .iter()
            .map(|t| hard_clean(&t.description, 0))
            .collect();
        let embeddings = try_join_all(normalized.iter().map(|text| embedder.encode(text))).await?;

        let entries = transactions
            .into_iter()
            .zip(normalized)
            .zip(embeddings)
            .map(|((transaction, text), embedding)| IndexedTransaction {
                token_count: embedder.token_count(&text),
                transaction,
                embedding,
            })
            .collect::<Vec<_>>();

        info!("Indexed {} transactions for similarity lookup", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `top_k` transactions most similar to the given one, excluding the
    /// transaction itself. Unknown ids are an error.
    pub fn similar(&self, transaction_id: &str, top_k: usize) -> Result<Vec<SimilarTransaction>> {
        let anchor = match self
            .entries
            .iter()
            .find(|e| e.transaction.id == transaction_id)
        {
            Some(entry) => entry,
            None => bail!("Unknown transaction id {transaction_id}"),
        };

        let mut scored: Vec<SimilarTransaction> = self
            .entries
            .iter()
            .filter(|e| e.transaction.id != transaction_id)
            .map(|entry| {
                let similarity = cosine_similarity_candle(&anchor.embedding, &entry.embedding)
                    .unwrap_or_else(|e| {
                        warn!(
                            "Cosine similarity failed for transaction {}: {e:#}",
                            entry.transaction.id
                        );
                        0.0
                    });
                SimilarTransaction {
                    id: entry.transaction.id.clone(),
                    description: entry.transaction.description.clone(),
                    similarity: round4(similarity),
                    token_count: entry.token_count,
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashedNgramEmbedder;

    fn transaction(id: &str, description: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            description: description.to_string(),
        }
    }

    async fn index() -> TransactionIndex {
        let embedder = HashedNgramEmbedder::default();
        TransactionIndex::build(
            &embedder,
            vec![
                transaction("t1", "Payment from Emma Brown for Deel"),
                transaction("t2", "Transfer from Emma Brown for Deel"),
                transaction("t3", "Received from Jack Cooper"),
            ],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn identical_normalized_descriptions_score_one() {
        let index = index().await;
        // t1 and t2 hard-clean to the same text.
        let similar = index.similar("t1", 5).unwrap();
        assert_eq!(similar[0].id, "t2");
        assert_eq!(similar[0].similarity, 1.0);
    }

    #[tokio::test]
    async fn excludes_the_anchor_transaction() {
        let index = index().await;
        let similar = index.similar("t1", 5).unwrap();
        assert!(similar.iter().all(|s| s.id != "t1"));
        assert_eq!(similar.len(), 2);
    }

    #[tokio::test]
    async fn respects_top_k() {
        let index = index().await;
        assert_eq!(index.similar("t1", 1).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_transaction_id_is_an_error() {
        let index = index().await;
        assert!(index.similar("missing", 5).is_err());
    }

    #[tokio::test]
    async fn reports_token_counts_of_normalized_text() {
        let index = index().await;
        let similar = index.similar("t3", 5).unwrap();
        // "Payment from Emma Brown for Deel" hard-cleans to "emma brown".
        let t1 = similar.iter().find(|s| s.id == "t1").unwrap();
        assert_eq!(t1.token_count, 2);
    }
}
