//! Synonym dictionary filtering.
//!
//! # Invariants
//! - Matching is a case-insensitive substring test on the headword.
//! - A blank query matches every headword.
//! - Results are sorted by headword for stable rendering.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct SynonymEntry {
    #[serde(rename = "sinonimos", default)]
    synonyms: Vec<String>,
}

/// Headword -> synonyms dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymIndex {
    entries: BTreeMap<String, Vec<String>>,
}

/// One filtered row ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymHit {
    pub word: String,
    pub synonyms: Vec<String>,
}

impl SynonymIndex {
    /// Parses the `/sinonimos` payload: `{"word": {"sinonimos": [...]}}`.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, SynonymEntry> = serde_json::from_str(payload)?;
        let entries = raw
            .into_iter()
            .map(|(word, entry)| (word, entry.synonyms))
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns synonyms for an exact headword.
    pub fn synonyms_of(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    /// Returns headwords containing `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<SynonymHit> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|(word, _)| needle.is_empty() || word.to_lowercase().contains(&needle))
            .map(|(word, synonyms)| SynonymHit {
                word: word.clone(),
                synonyms: synonyms.clone(),
            })
            .collect()
    }
}
