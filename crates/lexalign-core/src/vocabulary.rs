// crates/lexalign-core/src/vocabulary.rs
//
// Bidirectional word <-> row-id mapping backing every matrix lookup.
//
// Row ids follow lexicographic word order, so two builds over the same
// vocabulary always agree on which row holds which word.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::LexAlignError;

/// A dense, immutable index over a vocabulary.
///
/// `words[i]` is the word stored at row `i`; `ids[word] == i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyIndex {
    words: Vec<String>,
    ids: HashMap<String, usize>,
}

impl VocabularyIndex {
    /// Build an index from any collection of words.
    ///
    /// Words are sorted lexicographically and deduplicated. Returns
    /// `EmptyVocabulary` if no word is supplied.
    pub fn new<I, S>(words: I) -> Result<Self, LexAlignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(LexAlignError::EmptyVocabulary);
        }
        words.sort();
        words.dedup();

        let ids = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        Ok(Self { words, ids })
    }

    /// Row id of `word`, if present.
    pub fn id(&self, word: &str) -> Option<usize> {
        self.ids.get(word).copied()
    }

    /// Word stored at row `id`, if in range.
    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// All words in row order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a constructed index; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words present in both indices, in lexicographic order.
    ///
    /// Iterates the smaller index and looks words up in the larger one.
    pub fn intersection<'a>(&'a self, other: &'a VocabularyIndex) -> Vec<&'a str> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .words
            .iter()
            .filter(|w| large.contains(w))
            .map(String::as_str)
            .collect()
    }
}
