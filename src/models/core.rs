// src/models/core.rs
use serde::Deserialize;

/// A directory user as supplied by the loader. Multiple users may legally
/// share an identical name; they stay distinct records throughout matching.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// A transaction record for the demo driver and the similarity index.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
}

/// A user after startup preparation: normalized name forms, token features
/// and (once the directory has been embedded) the precomputed embedding.
/// Immutable after startup; queries only ever read these.
#[derive(Debug, Clone)]
pub struct PreparedUser {
    pub id: String,
    pub name_raw: String,
    /// Lowercased, diacritic-stripped form used for all fuzzy comparisons.
    pub normalized_name: String,
    pub tokens: Vec<String>,
    /// Lowercased initials, one char per token.
    pub initials: String,
    /// "last first" form, present only for two-token names.
    pub reversed_name: Option<String>,
    pub embedding: Option<Vec<f32>>,
}
