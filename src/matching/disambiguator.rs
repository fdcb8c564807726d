// src/matching/disambiguator.rs
// Final ordering of accepted matches. Ranking is a fixed tie-break chain:
// score, then primary mentions over secondary ones, then edit distance
// between the user's normalized name and the winning variant, then user id.
// The chain is total, so duplicate directory names always come out in a
// stable order.

use std::cmp::Ordering;

use strsim::levenshtein;

use crate::models::core::PreparedUser;
use crate::models::matching::{MatchResult, ScoredMatch};
use crate::utils::round2;

/// Order accepted matches and project them into the output shape, keeping at
/// most `top_k`.
pub fn rank(users: &[PreparedUser], mut matches: Vec<ScoredMatch>, top_k: usize) -> Vec<MatchResult> {
    matches.sort_by(|a, b| compare(users, a, b));
    matches.truncate(top_k);
    matches
        .into_iter()
        .map(|m| MatchResult {
            id: m.user_id,
            name: users[m.user_index].name_raw.clone(),
            match_metric: round2(m.score),
            method: m.method,
        })
        .collect()
}

fn compare(users: &[PreparedUser], a: &ScoredMatch, b: &ScoredMatch) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.is_secondary_mention.cmp(&b.is_secondary_mention))
        .then_with(|| edit_distance(users, a).cmp(&edit_distance(users, b)))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

fn edit_distance(users: &[PreparedUser], m: &ScoredMatch) -> usize {
    levenshtein(&users[m.user_index].normalized_name, &m.variant)
}
