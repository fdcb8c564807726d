// src/models/matching.rs
use std::ops::Range;

use serde::Serialize;

/// Which stage of the pipeline produced a score. A query resolves through
/// exactly one method; fuzzy and embedding results are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethodType {
    Fuzzy,
    Embedding,
}

impl MatchMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethodType::Fuzzy => "fuzzy",
            MatchMethodType::Embedding => "embedding",
        }
    }
}

/// Anchor rule that located a candidate span. Ordered by extraction
/// confidence: `From` is the strongest signal, `FallbackWindow` the weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    From,
    Ref,
    ForDeel,
    FallbackWindow,
}

impl AnchorKind {
    pub fn priority(&self) -> u8 {
        match self {
            AnchorKind::From => 3,
            AnchorKind::Ref => 2,
            AnchorKind::ForDeel => 1,
            AnchorKind::FallbackWindow => 0,
        }
    }
}

/// A text span hypothesized to contain a user's name, plus the positional
/// metadata the scorers need. Lives for a single request only.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub text: String,
    /// Byte range of the span in the cleaned description it was cut from.
    pub span: Range<usize>,
    pub anchor: AnchorKind,
    /// True when the span sits after a "cc"-style marker, flagging a
    /// presumed secondary counterparty.
    pub is_secondary_mention: bool,
}

/// One signed adjustment applied on top of a base fuzzy score. Kept on the
/// match for auditability.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreAdjustment {
    pub rule: &'static str,
    pub weight: f64,
}

/// Best score for one user within one query, before final ranking. Only the
/// winning (candidate, variant) pair per user survives to disambiguation.
#[derive(Debug, Clone)]
pub struct ScoredMatch {
    pub user_index: usize,
    pub user_id: String,
    pub score: f64,
    pub base_score: f64,
    pub method: MatchMethodType,
    pub adjustments: Vec<ScoreAdjustment>,
    /// The variant text that produced the winning score; used for the
    /// edit-distance tie-break.
    pub variant: String,
    pub is_secondary_mention: bool,
}

/// Final externally visible match entry.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub id: String,
    pub name: String,
    pub match_metric: f64,
    pub method: MatchMethodType,
}
