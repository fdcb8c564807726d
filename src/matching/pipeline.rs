// src/matching/pipeline.rs
// Orchestration of one match query: clean, extract candidate spans, expand
// variants, score lexically, and only when the lexical path accepts nothing
// fall through to the embedding path. A query resolves through exactly one
// method. The pipeline is immutable after startup and shared across queries.

use std::collections::HashSet;

use anyhow::{bail, Result};
use log::debug;

use crate::config::MatcherConfig;
use crate::embedder::Embedder;
use crate::matching::tables::{MisspellingTable, TransliterationTable};
use crate::matching::variants::VariantGenerator;
use crate::matching::{disambiguator, embedding, extractor, fuzzy};
use crate::models::core::{PreparedUser, User};
use crate::models::matching::{Candidate, MatchResult, ScoredMatch};
use crate::preprocessing::text_cleaner::{hard_clean, soft_clean};
use crate::preprocessing::user_processor::{collect_user_tokens, embed_directory, prepare_users};

pub struct MatchPipeline<E: Embedder> {
    config: MatcherConfig,
    embedder: E,
    users: Vec<PreparedUser>,
    user_tokens: HashSet<String>,
    transliterations: TransliterationTable,
    misspellings: MisspellingTable,
}

impl<E: Embedder> MatchPipeline<E> {
    pub fn new(
        config: MatcherConfig,
        embedder: E,
        users: Vec<User>,
        transliterations: TransliterationTable,
        misspellings: MisspellingTable,
    ) -> Result<Self> {
        let users = prepare_users(users);
        if users.is_empty() {
            bail!("User directory is empty after preparation; nothing to match against");
        }
        let user_tokens = collect_user_tokens(&users);
        Ok(Self {
            config,
            embedder,
            users,
            user_tokens,
            transliterations,
            misspellings,
        })
    }

    /// Precompute directory embeddings. Must run before the first query that
    /// may hit the embedding path.
    pub async fn precompute_embeddings(&mut self) -> Result<()> {
        embed_directory(&self.embedder, &mut self.users).await
    }

    pub fn users(&self) -> &[PreparedUser] {
        &self.users
    }

    /// Resolve one free-text description to ranked directory matches. An
    /// unmatchable description yields an empty list, never an error.
    pub async fn match_description(&self, description: &str) -> Result<Vec<MatchResult>> {
        let soft = soft_clean(description, self.config.max_description_len);
        if soft.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = extractor::extract_candidates(&soft, self.config.max_candidates);
        if candidates.is_empty() {
            // Anchors can be destroyed by noise the hard form removes.
            let hard = hard_clean(description, self.config.max_description_len);
            candidates = extractor::extract_candidates(&hard, self.config.max_candidates);
        }
        debug!(
            "Extracted {} candidate span(s) from description",
            candidates.len()
        );

        let accepted = self.score_fuzzy(&candidates);
        if !accepted.is_empty() {
            debug!("Fuzzy path accepted {} user(s)", accepted.len());
            return Ok(disambiguator::rank(
                &self.users,
                accepted,
                self.config.top_k,
            ));
        }

        let query = {
            let hard = hard_clean(description, self.config.max_description_len);
            if hard.is_empty() {
                soft.to_lowercase()
            } else {
                hard
            }
        };
        let semantic =
            embedding::score_directory(&self.config, &self.embedder, &self.users, &query).await;
        debug!("Embedding path accepted {} user(s)", semantic.len());
        Ok(disambiguator::rank(&self.users, semantic, self.config.top_k))
    }

    /// Score every (candidate, variant, user) triple and keep the accepted
    /// best score per user.
    fn score_fuzzy(&self, candidates: &[Candidate]) -> Vec<ScoredMatch> {
        let generator = VariantGenerator::new(
            &self.transliterations,
            &self.misspellings,
            &self.user_tokens,
            self.config.max_variants_per_candidate,
        );

        let mut accepted = Vec::new();
        for candidate in candidates {
            for variant in generator.generate(&candidate.text) {
                for (user_index, user) in self.users.iter().enumerate() {
                    let scored =
                        fuzzy::score_pair(&self.config, user, user_index, candidate, &variant);
                    if scored.score >= self.config.fuzzy_accept {
                        accepted.push(scored);
                    }
                }
            }
        }
        fuzzy::best_per_user(&self.users, accepted)
    }
}
