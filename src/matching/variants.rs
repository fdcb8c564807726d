// src/matching/variants.rs
// Expansion of a raw candidate span into normalized text variants to score
// against the directory: hard-cleaned base, token-order reversal, degluing of
// compounds against known directory tokens, noise-token removal,
// transliteration, and misspelling correction, in that order. Deterministic,
// order-preserving, capped.

use std::collections::HashSet;

use crate::matching::tables::{has_non_latin, MisspellingTable, TransliterationTable};
use crate::preprocessing::text_cleaner::hard_clean;

pub struct VariantGenerator<'a> {
    transliterations: &'a TransliterationTable,
    misspellings: &'a MisspellingTable,
    user_tokens: &'a HashSet<String>,
    max_variants: usize,
}

impl<'a> VariantGenerator<'a> {
    pub fn new(
        transliterations: &'a TransliterationTable,
        misspellings: &'a MisspellingTable,
        user_tokens: &'a HashSet<String>,
        max_variants: usize,
    ) -> Self {
        Self {
            transliterations,
            misspellings,
            user_tokens,
            max_variants,
        }
    }

    /// Expand one raw candidate span. The hard-cleaned base always comes
    /// first so downstream tie-breaks prefer the least-transformed variant.
    pub fn generate(&self, raw: &str) -> Vec<String> {
        let base = hard_clean(raw, 0);
        if base.is_empty() && !has_non_latin(raw) {
            return Vec::new();
        }

        let mut variants: Vec<String> = Vec::new();
        if !base.is_empty() {
            variants.push(base.clone());

            if let Some(reversed) = reverse_two_tokens(&base) {
                variants.push(reversed);
            }
            if let Some(deglued) = self.deglue_tokens(&base) {
                variants.push(deglued);
            }
            if let Some(stripped) = drop_single_letter_middles(&base) {
                variants.push(stripped);
            }
            if let Some(stripped) = strip_trailing_digits(&base) {
                variants.push(stripped);
            }
        }

        // Transliteration keys are the original scripts, so look up the raw
        // span, not the cleaned base.
        if has_non_latin(raw) {
            if let Some(latin) = self.transliterations.lookup(raw.trim()) {
                variants.push(latin.to_string());
                if let Some(reversed) = reverse_two_tokens(latin) {
                    variants.push(reversed);
                }
            }
        }

        // Misspelling corrections run last, over everything produced so far.
        let snapshot: Vec<String> = variants.clone();
        for variant in &snapshot {
            if let Some(corrected) = self.misspellings.normalize(variant) {
                variants.push(corrected);
            }
        }

        dedup_preserving_order(variants, self.max_variants)
    }

    /// Split overlong tokens into two directory tokens: "emmabrown" becomes
    /// "emma brown" when both halves are known.
    fn deglue_tokens(&self, text: &str) -> Option<String> {
        let mut changed = false;
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|token| {
                if let Some(split) = self.split_glued(token) {
                    changed = true;
                    split
                } else {
                    token.to_string()
                }
            })
            .collect();
        if changed {
            Some(tokens.join(" "))
        } else {
            None
        }
    }

    fn split_glued(&self, token: &str) -> Option<String> {
        if !token.is_ascii() || !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        let len = token.len();
        if len <= 6 {
            return None;
        }
        for split_at in 3..=len - 3 {
            let (left, right) = token.split_at(split_at);
            if self.user_tokens.contains(left) && self.user_tokens.contains(right) {
                return Some(format!("{left} {right}"));
            }
        }
        None
    }
}

fn reverse_two_tokens(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() == 2 {
        Some(format!("{} {}", tokens[1], tokens[0]))
    } else {
        None
    }
}

/// Drop single-letter interior tokens ("john q smith" -> "john smith").
fn drop_single_letter_middles(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    let last = tokens.len() - 1;
    let kept: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| *i == 0 || *i == last || token.chars().count() > 1)
        .map(|(_, token)| *token)
        .collect();
    if kept.len() < tokens.len() {
        Some(kept.join(" "))
    } else {
        None
    }
}

/// Strip trailing digits glued onto tokens ("smith22" -> "smith").
fn strip_trailing_digits(text: &str) -> Option<String> {
    let mut changed = false;
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            let stripped = token.trim_end_matches(|c: char| c.is_ascii_digit());
            if stripped.len() < token.len() && !stripped.is_empty() {
                changed = true;
                stripped.to_string()
            } else {
                token.to_string()
            }
        })
        .collect();
    if changed {
        Some(tokens.join(" "))
    } else {
        None
    }
}

fn dedup_preserving_order(variants: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for variant in variants {
        if !variant.is_empty() && seen.insert(variant.clone()) {
            unique.push(variant);
            if unique.len() >= cap {
                break;
            }
        }
    }
    unique
}
