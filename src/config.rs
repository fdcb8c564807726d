// src/config.rs
use std::env;
use std::time::Duration;

use log::info;

/// Central configuration for the matching pipeline: acceptance thresholds,
/// scoring adjustments and per-request limits. Defaults carry the calibrated
/// values; every field can be overridden through `MATCHER_*` environment
/// variables.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum fuzzy score (0-100) for the fuzzy path to be accepted.
    pub fuzzy_accept: f64,
    /// Minimum cosine similarity (0-1) for the embedding path.
    pub embedding_accept: f64,

    // Scoring adjustments (additive, applied before clamping to [0, 100]).
    pub first_name_bonus: f64,
    pub last_name_bonus: f64,
    pub initials_bonus: f64,
    pub secondary_mention_penalty: f64,
    pub fallback_window_penalty: f64,

    // Per-request limits.
    pub top_k: usize,
    pub max_candidates: usize,
    pub max_variants_per_candidate: usize,
    pub max_description_len: usize,

    /// Budget for the single external suspension point (the embedding call).
    pub embedding_timeout: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_accept: 70.0,
            embedding_accept: 0.75,
            first_name_bonus: 5.0,
            last_name_bonus: 5.0,
            initials_bonus: 3.0,
            secondary_mention_penalty: -8.0,
            fallback_window_penalty: -5.0,
            top_k: 5,
            max_candidates: 5,
            max_variants_per_candidate: 8,
            max_description_len: 1000,
            embedding_timeout: Duration::from_millis(200),
        }
    }
}

impl MatcherConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = parse_env::<f64>("MATCHER_FUZZY_ACCEPT") {
            config.fuzzy_accept = v;
        }
        if let Some(v) = parse_env::<f64>("MATCHER_EMBEDDING_ACCEPT") {
            config.embedding_accept = v;
        }
        if let Some(v) = parse_env::<f64>("MATCHER_FIRST_NAME_BONUS") {
            config.first_name_bonus = v;
        }
        if let Some(v) = parse_env::<f64>("MATCHER_LAST_NAME_BONUS") {
            config.last_name_bonus = v;
        }
        if let Some(v) = parse_env::<f64>("MATCHER_INITIALS_BONUS") {
            config.initials_bonus = v;
        }
        if let Some(v) = parse_env::<f64>("MATCHER_SECONDARY_MENTION_PENALTY") {
            config.secondary_mention_penalty = v;
        }
        if let Some(v) = parse_env::<f64>("MATCHER_FALLBACK_WINDOW_PENALTY") {
            config.fallback_window_penalty = v;
        }
        if let Some(v) = parse_env::<usize>("MATCHER_TOP_K") {
            config.top_k = v;
        }
        if let Some(v) = parse_env::<usize>("MATCHER_MAX_CANDIDATES") {
            config.max_candidates = v;
        }
        if let Some(v) = parse_env::<usize>("MATCHER_MAX_VARIANTS") {
            config.max_variants_per_candidate = v;
        }
        if let Some(v) = parse_env::<usize>("MATCHER_MAX_DESCRIPTION_LEN") {
            config.max_description_len = v;
        }
        if let Some(v) = parse_env::<u64>("MATCHER_EMBEDDING_TIMEOUT_MS") {
            config.embedding_timeout = Duration::from_millis(v);
        }

        config
    }

    pub fn log_config(&self) {
        info!(
            "Matcher thresholds: fuzzy_accept={}, embedding_accept={}, top_k={}",
            self.fuzzy_accept, self.embedding_accept, self.top_k
        );
        info!(
            "Matcher limits: max_candidates={}, max_variants={}, embedding_timeout={}ms",
            self.max_candidates,
            self.max_variants_per_candidate,
            self.embedding_timeout.as_millis()
        );
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
