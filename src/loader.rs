// src/loader.rs
// Flat-file ingestion boundary: supplies the immutable user directory (and,
// for the demo binary, transactions) at startup. Matching never touches the
// filesystem after this.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::models::core::{Transaction, User};

pub trait UserDirectoryLoader {
    fn load(&self) -> Result<Vec<User>>;
}

/// Loads users from a JSON array of `{ "id": ..., "name": ... }` records.
pub struct JsonDirectoryLoader {
    path: std::path::PathBuf,
}

impl JsonDirectoryLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl UserDirectoryLoader for JsonDirectoryLoader {
    fn load(&self) -> Result<Vec<User>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open user directory file {:?}", self.path))?;
        let users: Vec<User> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse user directory file {:?}", self.path))?;
        info!("Loaded {} users from {:?}", users.len(), self.path);
        Ok(users)
    }
}

/// Loads transactions from a JSON array of `{ "id": ..., "description": ... }`.
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open transactions file {:?}", path))?;
    let transactions: Vec<Transaction> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse transactions file {:?}", path))?;
    info!("Loaded {} transactions from {:?}", transactions.len(), path);
    Ok(transactions)
}
