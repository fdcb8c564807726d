// src/preprocessing/user_processor.rs
// One-time directory preparation: normalize every user name, derive the token
// features the fuzzy scorer needs, and precompute embeddings. Must complete
// before the pipeline serves its first query so no request ever observes a
// partially embedded directory.

use std::collections::HashSet;

use anyhow::{bail, Result};
use futures::future::try_join_all;
use log::{debug, info};

use crate::embedder::Embedder;
use crate::models::core::{PreparedUser, User};
use crate::preprocessing::text_cleaner::strip_diacritics;

/// Normalize raw users into matchable records. Users with empty or unusable
/// names are dropped with a debug log rather than failing startup.
pub fn prepare_users(users: Vec<User>) -> Vec<PreparedUser> {
    let mut prepared = Vec::with_capacity(users.len());

    for user in users {
        let name_raw = user.name.trim().to_string();
        if user.id.is_empty() || name_raw.is_empty() {
            debug!("Skipping user {:?} with empty id or name", user.id);
            continue;
        }

        let normalized_name = normalize_name(&name_raw);
        if normalized_name.is_empty() {
            debug!("Skipping user {} whose name normalizes to empty", user.id);
            continue;
        }

        let tokens: Vec<String> = normalized_name
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();
        let initials: String = tokens
            .iter()
            .filter_map(|t| t.chars().next())
            .collect();
        let reversed_name = if tokens.len() == 2 {
            Some(format!("{} {}", tokens[1], tokens[0]))
        } else {
            None
        };

        prepared.push(PreparedUser {
            id: user.id,
            name_raw,
            normalized_name,
            tokens,
            initials,
            reversed_name,
            embedding: None,
        });
    }

    info!("Prepared {} users for matching", prepared.len());
    prepared
}

/// Lowercase + diacritic strip + whitespace collapse; the canonical
/// comparison form for a directory name.
pub fn normalize_name(name: &str) -> String {
    strip_diacritics(&name.to_lowercase())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Populate `embedding` for every prepared user by encoding the normalized
/// name. Runs synchronously at startup; a dimension mismatch or encoder
/// failure is fatal, not retried.
pub async fn embed_directory<E: Embedder>(
    embedder: &E,
    prepared: &mut [PreparedUser],
) -> Result<()> {
    if prepared.is_empty() {
        return Ok(());
    }

    let futures = prepared
        .iter()
        .map(|user| embedder.encode(&user.normalized_name));
    let embeddings = try_join_all(futures).await?;

    let dim = embeddings[0].len();
    for (user, embedding) in prepared.iter_mut().zip(embeddings) {
        if embedding.len() != dim {
            bail!(
                "Embedding dimension mismatch for user {}: {} != {}",
                user.id,
                embedding.len(),
                dim
            );
        }
        user.embedding = Some(embedding);
    }

    info!(
        "Precomputed {}-dimensional embeddings for {} users",
        dim,
        prepared.len()
    );
    Ok(())
}

/// Every distinct name token across the directory; the dictionary the variant
/// generator uses to split glued words.
pub fn collect_user_tokens(prepared: &[PreparedUser]) -> HashSet<String> {
    let mut tokens = HashSet::new();
    for user in prepared {
        for token in &user.tokens {
            tokens.insert(token.clone());
        }
    }
    tokens
}
