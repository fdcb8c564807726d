// src/matching/fuzzy.rs
// Lexical scoring of candidate variants against prepared users. The base
// score is the maximum over a family of string-similarity metrics, then a
// fixed rule table applies name-structure bonuses and position penalties.
// All scores live on a 0-100 scale and are clamped after adjustment.

use std::cmp::Ordering;
use std::collections::HashSet;

use strsim::{jaro_winkler, levenshtein, normalized_levenshtein};

use crate::config::MatcherConfig;
use crate::models::core::PreparedUser;
use crate::models::matching::{
    AnchorKind, Candidate, MatchMethodType, ScoreAdjustment, ScoredMatch,
};

/// Levenshtein-based similarity on a 0-100 scale.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    normalized_levenshtein(a, b) * 100.0
}

/// Best alignment of the shorter string against equal-length windows of the
/// longer one; catches names embedded in noise.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = shorter.chars().count();
    if short_len == 0 {
        return 0.0;
    }
    let long_chars: Vec<char> = longer.chars().collect();
    if short_len == long_chars.len() {
        return ratio(shorter, longer);
    }
    let mut best: f64 = 0.0;
    for window in long_chars.windows(short_len) {
        let slice: String = window.iter().collect();
        best = best.max(ratio(shorter, &slice));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Ratio over whitespace tokens sorted lexicographically; word order stops
/// mattering.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Ratio over token-set decompositions; shared tokens dominate, extras cost
/// little.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    let mut intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let mut only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let mut only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();
    intersection.sort_unstable();
    only_a.sort_unstable();
    only_b.sort_unstable();

    let base = intersection.join(" ");
    let combined_a = join_nonempty(&base, &only_a.join(" "));
    let combined_b = join_nonempty(&base, &only_b.join(" "));

    ratio(&base, &combined_a)
        .max(ratio(&base, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}

/// Maximum over the metric family, against the user's normalized name and
/// its reversed form when one exists.
pub fn base_similarity(variant: &str, user: &PreparedUser) -> f64 {
    let mut best = similarity(variant, &user.normalized_name);
    if let Some(reversed) = &user.reversed_name {
        best = best.max(similarity(variant, reversed));
    }
    best
}

fn similarity(a: &str, b: &str) -> f64 {
    ratio(a, b)
        .max(partial_ratio(a, b))
        .max(token_sort_ratio(a, b))
        .max(token_set_ratio(a, b))
        .max(jaro_winkler(a, b) * 100.0)
}

/// Score one (user, candidate, variant) triple: base metric plus the rule
/// table, clamped to [0, 100].
pub fn score_pair(
    config: &MatcherConfig,
    user: &PreparedUser,
    user_index: usize,
    candidate: &Candidate,
    variant: &str,
) -> ScoredMatch {
    let base_score = base_similarity(variant, user);
    let adjustments = rule_adjustments(config, user, candidate, variant);
    let adjusted: f64 = base_score + adjustments.iter().map(|a| a.weight).sum::<f64>();
    ScoredMatch {
        user_index,
        user_id: user.id.clone(),
        score: adjusted.clamp(0.0, 100.0),
        base_score,
        method: MatchMethodType::Fuzzy,
        adjustments,
        variant: variant.to_string(),
        is_secondary_mention: candidate.is_secondary_mention,
    }
}

fn rule_adjustments(
    config: &MatcherConfig,
    user: &PreparedUser,
    candidate: &Candidate,
    variant: &str,
) -> Vec<ScoreAdjustment> {
    // Bonuses are positional: the variant's first token against the user's
    // first, last against last. A token merely present somewhere in a noisy
    // span earns nothing.
    let variant_tokens: Vec<&str> = variant.split_whitespace().collect();
    let first_matches = match (variant_tokens.first(), user.tokens.first()) {
        (Some(v), Some(u)) => *v == u.as_str(),
        _ => false,
    };
    let last_matches = user.tokens.len() > 1
        && variant_tokens.len() > 1
        && variant_tokens.last().copied() == user.tokens.last().map(|u| u.as_str());
    // Initials only carry weight when no full name token matched.
    let initials_match = !first_matches && !last_matches && user.initials.len() >= 2 && {
        let variant_initials: String = variant_tokens
            .iter()
            .filter_map(|t| t.chars().next())
            .collect();
        variant_initials == user.initials
    };

    let rules: [(&'static str, f64, bool); 5] = [
        ("first_name_match", config.first_name_bonus, first_matches),
        ("last_name_match", config.last_name_bonus, last_matches),
        ("initials_match", config.initials_bonus, initials_match),
        (
            "secondary_mention",
            config.secondary_mention_penalty,
            candidate.is_secondary_mention,
        ),
        (
            "fallback_window",
            config.fallback_window_penalty,
            candidate.anchor == AnchorKind::FallbackWindow,
        ),
    ];

    rules
        .into_iter()
        .filter(|(_, _, applies)| *applies)
        .map(|(rule, weight, _)| ScoreAdjustment { rule, weight })
        .collect()
}

/// Keep only the best match per user. Score decides; among equal scores a
/// primary mention beats a secondary one, then the variant closest to the
/// user's normalized name wins, so noisy spans never shadow a clean hit.
pub fn best_per_user(users: &[PreparedUser], mut matches: Vec<ScoredMatch>) -> Vec<ScoredMatch> {
    matches.sort_by(|a, b| {
        a.user_index
            .cmp(&b.user_index)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            .then_with(|| a.is_secondary_mention.cmp(&b.is_secondary_mention))
            .then_with(|| {
                let dist_a = levenshtein(&users[a.user_index].normalized_name, &a.variant);
                let dist_b = levenshtein(&users[b.user_index].normalized_name, &b.variant);
                dist_a.cmp(&dist_b)
            })
    });
    matches.dedup_by_key(|m| m.user_index);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::user_processor::prepare_users;
    use crate::models::core::User;

    fn prepared(name: &str) -> PreparedUser {
        let users = vec![User {
            id: "u1".to_string(),
            name: name.to_string(),
        }];
        prepare_users(users).into_iter().next().unwrap()
    }

    fn plain_candidate(text: &str) -> Candidate {
        Candidate {
            text: text.to_string(),
            span: 0..text.len(),
            anchor: AnchorKind::From,
            is_secondary_mention: false,
        }
    }

    #[test]
    fn identical_strings_score_hundred() {
        assert_eq!(ratio("emma brown", "emma brown"), 100.0);
        assert_eq!(token_sort_ratio("emma brown", "emma brown"), 100.0);
    }

    #[test]
    fn token_sort_ignores_word_order() {
        assert_eq!(token_sort_ratio("brown emma", "emma brown"), 100.0);
    }

    #[test]
    fn partial_ratio_finds_embedded_names() {
        assert_eq!(partial_ratio("smith", "john smith"), 100.0);
    }

    #[test]
    fn token_set_ignores_extra_tokens() {
        assert_eq!(token_set_ratio("john smith", "mr john smith esq"), 100.0);
    }

    #[test]
    fn exact_variant_scores_hundred_after_clamp() {
        let config = MatcherConfig::default();
        let user = prepared("Emma Brown");
        let candidate = plain_candidate("Emma Brown");
        let scored = score_pair(&config, &user, 0, &candidate, "emma brown");
        assert_eq!(scored.score, 100.0);
        assert_eq!(scored.base_score, 100.0);
        // Both name-token bonuses applied but the total stays clamped.
        assert_eq!(scored.adjustments.len(), 2);
    }

    #[test]
    fn reversed_name_still_scores_high() {
        let config = MatcherConfig::default();
        let user = prepared("Emma Brown");
        let candidate = plain_candidate("Brown Emma");
        let scored = score_pair(&config, &user, 0, &candidate, "brown emma");
        assert!(scored.score >= config.fuzzy_accept);
    }

    #[test]
    fn secondary_mention_penalty_lowers_imperfect_scores() {
        let config = MatcherConfig::default();
        let user = prepared("John Smith");
        let mut candidate = plain_candidate("jon smeth");
        let clean = score_pair(&config, &user, 0, &candidate, "jon smeth");
        candidate.is_secondary_mention = true;
        let penalized = score_pair(&config, &user, 0, &candidate, "jon smeth");
        assert!(clean.base_score < 92.0);
        assert!(
            ((clean.score - penalized.score) - (-config.secondary_mention_penalty)).abs() < 1e-9
        );
    }

    #[test]
    fn initials_bonus_only_without_full_token_match() {
        let config = MatcherConfig::default();
        let user = prepared("John Smith");
        let candidate = plain_candidate("j s");
        let scored = score_pair(&config, &user, 0, &candidate, "j s");
        assert!(scored
            .adjustments
            .iter()
            .any(|a| a.rule == "initials_match"));

        let full = score_pair(&config, &user, 0, &candidate, "john smith");
        assert!(!full
            .adjustments
            .iter()
            .any(|a| a.rule == "initials_match"));
    }

    #[test]
    fn fallback_window_candidates_are_penalized() {
        let config = MatcherConfig::default();
        let user = prepared("John Smith");
        let candidate = Candidate {
            text: "jon smeth".to_string(),
            span: 0..9,
            anchor: AnchorKind::FallbackWindow,
            is_secondary_mention: false,
        };
        let scored = score_pair(&config, &user, 0, &candidate, "jon smeth");
        assert!(scored
            .adjustments
            .iter()
            .any(|a| a.rule == "fallback_window"));
    }

    #[test]
    fn scores_never_leave_unit_range() {
        let config = MatcherConfig::default();
        let user = prepared("John Smith");
        let candidate = Candidate {
            text: "zzz".to_string(),
            span: 0..3,
            anchor: AnchorKind::FallbackWindow,
            is_secondary_mention: true,
        };
        let scored = score_pair(&config, &user, 0, &candidate, "zzz");
        assert!(scored.score >= 0.0 && scored.score <= 100.0);
    }

    #[test]
    fn name_bonuses_compare_token_positions() {
        let config = MatcherConfig::default();
        let user = prepared("John Smith");
        let candidate = plain_candidate("smith john");

        let reversed = score_pair(&config, &user, 0, &candidate, "smith john");
        assert!(reversed.adjustments.is_empty());

        let embedded = score_pair(&config, &user, 0, &candidate, "mr john smith");
        assert_eq!(embedded.adjustments.len(), 1);
        assert_eq!(embedded.adjustments[0].rule, "last_name_match");
    }

    #[test]
    fn best_per_user_keeps_highest_score() {
        let config = MatcherConfig::default();
        let user = prepared("John Smith");
        let candidate = plain_candidate("john smith");
        let strong = score_pair(&config, &user, 0, &candidate, "john smith");
        let weak = score_pair(&config, &user, 0, &candidate, "jon");
        let best = best_per_user(std::slice::from_ref(&user), vec![weak, strong]);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].score, 100.0);
    }

    #[test]
    fn best_per_user_prefers_primary_clean_variant_on_score_ties() {
        let config = MatcherConfig::default();
        let user = prepared("Anna Lee");
        let primary = plain_candidate("Anna Lee");
        let mut secondary = plain_candidate("Anna Lee");
        secondary.is_secondary_mention = true;

        // Both clamp to 100: the exact primary hit and a penalized secondary
        // one whose bonuses overshoot the cap.
        let clean = score_pair(&config, &user, 0, &primary, "anna lee");
        let noisy = score_pair(&config, &user, 0, &secondary, "anna lee");
        assert_eq!(clean.score, noisy.score);
        let best = best_per_user(std::slice::from_ref(&user), vec![noisy, clean]);
        assert!(!best[0].is_secondary_mention);

        // Equal primary scores: the variant nearest the normalized name wins.
        let blob = score_pair(&config, &user, 0, &primary, "anna lee cc ref john smith");
        let exact = score_pair(&config, &user, 0, &primary, "anna lee");
        assert_eq!(blob.score, exact.score);
        let best = best_per_user(std::slice::from_ref(&user), vec![blob, exact]);
        assert_eq!(best[0].variant, "anna lee");
    }
}
