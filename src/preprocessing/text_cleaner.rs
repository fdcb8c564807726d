// src/preprocessing/text_cleaner.rs
// Two-stage cleaning of transaction descriptions: a soft form that keeps the
// case and anchor keywords candidate extraction relies on, and a hard form
// normalized for fuzzy comparison. Both are pure; garbage in, empty string
// out, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// ACC//<digits, spaces, dots> account blocks carry no name signal.
static ACC_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)acc//[\d\s.]+").unwrap());

/// Everything that is not a word char, whitespace, colon (anchors like
/// "ref:"), or a name-internal hyphen/apostrophe becomes a space.
static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s:'-]").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Boilerplate tokens removed in the hard form only; the soft form must keep
/// "from"/"for" for anchor detection.
static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(from|for|deel|payment|transfer|received|request|credit|debit|to|cntr|wise|test)\b",
    )
    .unwrap()
});

static DIGIT_LOOKALIKES: Lazy<[(Regex, &'static str); 4]> = Lazy::new(|| {
    [
        (Regex::new(r"\b0([a-z])").unwrap(), "o$1"),
        (Regex::new(r"([a-z])0\b").unwrap(), "${1}o"),
        (Regex::new(r"\b1([a-z])").unwrap(), "l$1"),
        (Regex::new(r"([a-z])1\b").unwrap(), "${1}l"),
    ]
});

/// Soft clean: strip control chars and account blocks, map symbols to spaces,
/// collapse whitespace, truncate. Case and anchor keywords are preserved.
pub fn soft_clean(text: &str, max_len: usize) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    // Tabs and newlines are control chars; they must become spaces, not
    // vanish and glue tokens together.
    let text: String = text
        .nfkc()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let text = ACC_BLOCK_RE.replace_all(&text, " ");
    let text = SYMBOL_RE.replace_all(&text, " ");
    let text = trim_token_edges(&text);
    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();

    if max_len > 0 {
        text.chars().take(max_len).collect()
    } else {
        text.to_string()
    }
}

/// Hard clean: soft clean, then lowercase, strip diacritics, map
/// digit-lookalikes adjacent to letters (0→o, 1→l), drop boilerplate tokens
/// and residual punctuation.
pub fn hard_clean(text: &str, max_len: usize) -> String {
    let text = soft_clean(text, max_len).to_lowercase();
    if text.is_empty() {
        return text;
    }

    let mut text = strip_diacritics(&text);
    for (re, replacement) in DIGIT_LOOKALIKES.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }
    let text = BOILERPLATE_RE.replace_all(&text, " ");
    let text = text.replace(':', " ");
    let text = trim_token_edges(&text);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Decompose and drop combining marks (é→e). Non-Latin scripts pass through
/// so transliteration lookups further down still see them.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Hyphens and apostrophes are only kept inside tokens ("O'Brien",
/// "Smith-Jones"); stray ones at token edges are trimmed away.
fn trim_token_edges(text: &str) -> String {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c| c == '-' || c == '\''))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
