// src/matching/extractor.rs
// Candidate name extraction over the soft-cleaned description. An ordered
// list of anchor rules, each a small pure matcher: "from"-style prefixes,
// "ref:" markers, spans preceding "for deel", and as a last resort sliding
// token windows over the whole text. Extraction never fails; no anchor and no
// usable window simply yields an empty candidate list.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::matching::{AnchorKind, Candidate};

const BOILERPLATE_WORDS: [&str; 13] = [
    "from", "for", "deel", "payment", "transfer", "received", "request", "credit", "debit", "to",
    "cntr", "wise", "test",
];

const TRIM_PUNCT: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '-', '[', ']', '{', '}', '"', '\'',
];

/// Name following "from" (optionally "transfer/received/payment from"), up to
/// the next boilerplate or secondary-mention marker, comma or end. The "cc"
/// and "ref:" terminators matter because upstream cleaning turns commas into
/// spaces.
static FROM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:transfer|received|payment)\s+)?from\s+([^,]+?)(?:\s+for\b|\s+cc\b|\s+ref\s*:|,|$)",
    )
    .unwrap()
});

/// Name following a "ref:" marker.
static REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bref\s*:\s*([^,]+?)(?:\s+(?:cntr|for|and|cc)\b|,|$)").unwrap()
});

/// Text preceding a "for deel" marker; the trailing 2-4 words are the
/// probable name.
static FOR_DEEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(.+?)\s+for\s+deel\b").unwrap());

/// Secondary-mention markers; any candidate positioned after one is presumed
/// less likely to be the primary counterparty.
static CC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bcc\b|\bc\.c\.").unwrap());

/// Extract candidate spans from soft-cleaned text, highest-confidence anchors
/// first, deduplicated and capped at `max_candidates`.
pub fn extract_candidates(text: &str, max_candidates: usize) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    candidates.extend(extract_after_from(text));
    candidates.extend(extract_after_ref(text));
    candidates.extend(extract_before_for_deel(text));

    if candidates.is_empty() {
        candidates.extend(fallback_windows(text));
    }

    mark_secondary_mentions(text, &mut candidates);

    // Higher-confidence anchors first; longer spans are more specific.
    candidates.sort_by(|a, b| {
        b.anchor
            .priority()
            .cmp(&a.anchor.priority())
            .then(b.text.len().cmp(&a.text.len()))
    });

    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        let key = candidate.text.to_lowercase();
        if seen.insert(key) {
            unique.push(candidate);
            if unique.len() >= max_candidates {
                break;
            }
        }
    }
    unique
}

fn extract_after_from(text: &str) -> Vec<Candidate> {
    capture_rule(text, &FROM_RE, AnchorKind::From)
}

fn extract_after_ref(text: &str) -> Vec<Candidate> {
    capture_rule(text, &REF_RE, AnchorKind::Ref)
}

fn capture_rule(text: &str, re: &Regex, anchor: AnchorKind) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for caps in re.captures_iter(text) {
        if let Some(group) = caps.get(1) {
            if let Some(candidate) = make_candidate(group.as_str(), group.start(), anchor) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn extract_before_for_deel(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for caps in FOR_DEEL_RE.captures_iter(text) {
        let group = match caps.get(1) {
            Some(g) => g,
            None => continue,
        };
        let spans = token_spans(group.as_str());
        if spans.len() < 2 {
            continue;
        }
        // Keep only the trailing words; the head is usually boilerplate.
        let keep = spans.len().min(4);
        let first = spans[spans.len() - keep];
        let span_text = &group.as_str()[first.0..];
        if let Some(candidate) =
            make_candidate(span_text, group.start() + first.0, AnchorKind::ForDeel)
        {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Low-confidence fallback: sliding windows of 1-3 consecutive tokens across
/// the whole description.
fn fallback_windows(text: &str) -> Vec<Candidate> {
    let spans = token_spans(text);
    let mut candidates = Vec::new();
    for window_size in 1..=3usize {
        if spans.len() < window_size {
            break;
        }
        for window in spans.windows(window_size) {
            let start = window[0].0;
            let end = window[window.len() - 1].1;
            let window_text = &text[start..end];
            if !window_text.chars().any(|c| c.is_alphabetic()) {
                continue;
            }
            if let Some(candidate) = make_candidate(window_text, start, AnchorKind::FallbackWindow)
            {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn make_candidate(raw: &str, raw_start: usize, anchor: AnchorKind) -> Option<Candidate> {
    let trimmed = raw.trim().trim_matches(|c| TRIM_PUNCT.contains(&c)).trim();
    if !is_valid_candidate(trimmed) {
        return None;
    }
    let offset = raw.find(trimmed).unwrap_or(0);
    let start = raw_start + offset;
    Some(Candidate {
        text: trimmed.to_string(),
        span: start..start + trimmed.len(),
        anchor,
        is_secondary_mention: false,
    })
}

fn is_valid_candidate(text: &str) -> bool {
    if text.chars().count() < 2 {
        return false;
    }
    if !text.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    let words: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect();
    if words.is_empty() || words.len() > 6 {
        return false;
    }
    !words
        .iter()
        .all(|w| BOILERPLATE_WORDS.contains(&w.as_str()))
}

/// A candidate is a secondary mention when a cc marker precedes it or falls
/// inside its span.
fn mark_secondary_mentions(text: &str, candidates: &mut [Candidate]) {
    let cc_starts: Vec<usize> = CC_RE.find_iter(text).map(|m| m.start()).collect();
    if cc_starts.is_empty() {
        return;
    }
    for candidate in candidates.iter_mut() {
        if cc_starts.iter().any(|&cc| cc < candidate.span.end) {
            candidate.is_secondary_mention = true;
        }
    }
}

/// Byte ranges of whitespace-separated tokens.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}
