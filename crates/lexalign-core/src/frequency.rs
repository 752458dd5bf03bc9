// crates/lexalign-core/src/frequency.rs
//
// Read-only per-corpus token counts used to rank anchor candidates.
//
// Persisted externally as `{corpus_name: {word: count}}`. A corpus or word
// missing from the table counts as zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LexAlignError;

/// Corpus name -> (word -> occurrence count).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: HashMap<String, HashMap<String, u64>>,
}

impl FrequencyTable {
    pub fn new(counts: HashMap<String, HashMap<String, u64>>) -> Self {
        Self { counts }
    }

    /// Parse the JSON object form `{corpus: {word: count}}`.
    pub fn from_json(json: &str) -> Result<Self, LexAlignError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Occurrences of `word` in `corpus`, 0 if either is unknown.
    pub fn count(&self, corpus: &str, word: &str) -> u64 {
        self.counts
            .get(corpus)
            .and_then(|words| words.get(word))
            .copied()
            .unwrap_or(0)
    }

    /// Summed occurrences of `word` across two corpora.
    pub fn combined(&self, corpus_a: &str, corpus_b: &str, word: &str) -> u64 {
        self.count(corpus_a, word)
            .saturating_add(self.count(corpus_b, word))
    }

    pub fn has_corpus(&self, corpus: &str) -> bool {
        self.counts.contains_key(corpus)
    }

    /// Corpus names in lexicographic order.
    pub fn corpora(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.counts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
