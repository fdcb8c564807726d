// src/matching/tables.rs
// Static lookup data: transliterations for known non-Latin names and
// corrections for recurring misspellings. Loaded once, read-only, injected
// into the pipeline so tests can substitute minimal tables. A missing table
// file degrades to an empty table; the affected variant step is skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;

#[derive(Debug, Clone, Default)]
pub struct TransliterationTable {
    entries: HashMap<String, String>,
}

impl TransliterationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Transliterations for the non-Latin names observed in the dataset.
    pub fn with_defaults() -> Self {
        let entries = [
            // Chinese
            ("杨陈", "yang chen"),
            ("陈剑", "jian chen"),
            ("刘王", "liu wang"),
            ("李周", "li zhou"),
            // Greek
            ("Αλέξανδρος Μπέικερ", "alexander baker"),
            ("Στέλλα Σάντερς", "stella sanders"),
            ("Ανδρέας Ροντέελ", "andreas rodeel"),
            ("Ἄλεξις", "alexis"),
            // Hebrew
            ("אֲבִיגַיִל גרין", "avigail green"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { entries }
    }

    /// Load a `{source: transliteration}` JSON map; a missing file is a
    /// degraded mode (empty table), not an error.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Self {
        match load_map(path.as_ref()) {
            Ok(entries) => Self { entries },
            Err(e) => {
                warn!("Transliteration table unavailable ({e}); variant step will be skipped");
                Self::empty()
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.entries.get(name) {
            return Some(value);
        }
        let needle = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| key.trim().to_lowercase() == needle)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MisspellingTable {
    entries: HashMap<String, String>,
}

impl MisspellingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Corrections for mistakes observed in the dataset, including glued
    /// compounds.
    pub fn with_defaults() -> Self {
        let entries = [
            ("talor", "taylor"),
            ("gonzal ez", "gonzalez"),
            ("rodri guez", "rodriguez"),
            ("leedsfor", "leeds for"),
            ("brookers", "brooks"),
            ("matthewbrooks", "matthew brooks"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { entries }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Self {
        match load_map(path.as_ref()) {
            Ok(entries) => Self { entries },
            Err(e) => {
                warn!("Misspelling table unavailable ({e}); variant step will be skipped");
                Self::empty()
            }
        }
    }

    /// Correct a known misspelling: exact key match first, then substring
    /// replacement for glued forms. Returns None when nothing applies.
    pub fn normalize(&self, text: &str) -> Option<String> {
        let text_lower = text.trim().to_lowercase();
        if let Some(correction) = self.entries.get(&text_lower) {
            return Some(correction.clone());
        }
        for (misspelling, correction) in &self.entries {
            if text_lower.contains(misspelling.as_str()) {
                return Some(text_lower.replace(misspelling.as_str(), correction));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_map(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path).with_context(|| format!("Failed to open table file {path:?}"))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse table file {path:?}"))
}

/// True when the text carries characters outside the basic Latin range
/// (ignoring common punctuation), i.e. a transliteration lookup may help.
pub fn has_non_latin(text: &str) -> bool {
    text.chars()
        .any(|c| (c as u32) > 127 && !".,;:!?-()[]{}".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transliterates_known_names() {
        let table = TransliterationTable::with_defaults();
        assert_eq!(table.lookup("杨陈"), Some("yang chen"));
        assert_eq!(table.lookup("Αλέξανδρος Μπέικερ"), Some("alexander baker"));
        assert_eq!(table.lookup("John Smith"), None);
    }

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let table = TransliterationTable::with_defaults();
        assert_eq!(table.lookup("ΑΛΈΞΑΝΔΡΟΣ ΜΠΈΙΚΕΡ".to_lowercase().as_str()).is_some(), true);
    }

    #[test]
    fn corrects_exact_and_glued_misspellings() {
        let table = MisspellingTable::with_defaults();
        assert_eq!(table.normalize("talor"), Some("taylor".to_string()));
        assert_eq!(
            table.normalize("matthewbrooks"),
            Some("matthew brooks".to_string())
        );
        assert_eq!(table.normalize("emma brown"), None);
    }

    #[test]
    fn detects_non_latin_text() {
        assert!(has_non_latin("杨陈"));
        assert!(has_non_latin("אֲבִיגַיִל"));
        assert!(!has_non_latin("emma brown"));
        assert!(!has_non_latin("emma, brown!?"));
    }

    #[test]
    fn missing_table_file_degrades_to_empty() {
        let table = TransliterationTable::from_json_file("/nonexistent/table.json");
        assert!(table.is_empty());
    }
}
