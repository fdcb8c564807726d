// src/main.rs
use std::time::Instant;

use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;

use matcher_lib::config::MatcherConfig;
use matcher_lib::embedder::HashedNgramEmbedder;
use matcher_lib::loader::{load_transactions, JsonDirectoryLoader, UserDirectoryLoader};
use matcher_lib::matching::pipeline::MatchPipeline;
use matcher_lib::matching::tables::{MisspellingTable, TransliterationTable};
use matcher_lib::similar::TransactionIndex;

/// Demo driver: load a user directory and a transaction batch, resolve every
/// description, and print the ranked matches plus a similarity lookup for the
/// first transaction as JSON lines.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let start_time = Instant::now();

    let users_path =
        std::env::var("MATCHER_USERS_FILE").unwrap_or_else(|_| "data/users.json".to_string());
    let transactions_path = std::env::var("MATCHER_TRANSACTIONS_FILE")
        .unwrap_or_else(|_| "data/transactions.json".to_string());

    let config = MatcherConfig::from_env();
    config.log_config();

    let users = JsonDirectoryLoader::new(&users_path)
        .load()
        .with_context(|| format!("Failed to load user directory from {users_path}"))?;
    let transactions = load_transactions(&transactions_path)
        .with_context(|| format!("Failed to load transactions from {transactions_path}"))?;

    let transliterations = match std::env::var("MATCHER_TRANSLITERATIONS_FILE") {
        Ok(path) => TransliterationTable::from_json_file(path),
        Err(_) => TransliterationTable::with_defaults(),
    };
    let misspellings = match std::env::var("MATCHER_MISSPELLINGS_FILE") {
        Ok(path) => MisspellingTable::from_json_file(path),
        Err(_) => MisspellingTable::with_defaults(),
    };

    let embedder = HashedNgramEmbedder::default();
    let mut pipeline = MatchPipeline::new(
        config,
        embedder.clone(),
        users,
        transliterations,
        misspellings,
    )?;

    info!("Phase 1: Precomputing user directory embeddings...");
    pipeline.precompute_embeddings().await?;

    info!("Phase 2: Building transaction similarity index...");
    let index = TransactionIndex::build(&embedder, transactions.clone()).await?;

    info!("Phase 3: Resolving {} transactions...", transactions.len());
    for transaction in &transactions {
        let matches = pipeline
            .match_description(&transaction.description)
            .await
            .with_context(|| format!("Matching failed for transaction {}", transaction.id))?;
        let line = serde_json::json!({
            "transaction_id": transaction.id,
            "description": transaction.description,
            "matches": matches,
        });
        println!("{line}");
    }

    if let Some(first) = transactions.first() {
        let similar = index.similar(&first.id, 5)?;
        let line = serde_json::json!({
            "transaction_id": first.id,
            "similar": similar,
        });
        println!("{line}");
    }

    info!(
        "Processed {} transactions in {:.2?}",
        transactions.len(),
        start_time.elapsed()
    );
    Ok(())
}
