// crates/lexalign-align/src/anchors.rs
//
// Anchor selection: shared words used as training correspondences.
//
// Candidates are the intersection of the two vocabularies, ranked by their
// combined frequency in both corpora.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use lexalign_core::{FrequencyTable, LexAlignError, VocabularyIndex};

/// How many anchors to keep after ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorCap {
    /// Keep every shared word.
    Unbounded,
    /// Keep at most this many.
    Limit(usize),
}

impl AnchorCap {
    /// Interpret a signed command-line style cap: negative means unbounded,
    /// zero is rejected, positive is a limit.
    pub fn from_signed(k: i64) -> Result<Self, LexAlignError> {
        match k {
            k if k < 0 => Ok(AnchorCap::Unbounded),
            0 => Err(LexAlignError::InvalidK(0)),
            k => Ok(AnchorCap::Limit(k as usize)),
        }
    }
}

impl Default for AnchorCap {
    fn default() -> Self {
        AnchorCap::Unbounded
    }
}

/// A source/target word correspondence used to fit a transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPair {
    pub source: String,
    pub target: String,
}

impl AnchorPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// A shared word anchoring itself.
    pub fn identity(word: impl Into<String>) -> Self {
        let word = word.into();
        Self {
            source: word.clone(),
            target: word,
        }
    }
}

/// Ranked, duplicate-free anchors shared by both vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorList {
    words: Vec<String>,
}

impl AnchorList {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The anchors as identity pairs, in rank order.
    pub fn to_pairs(&self) -> Vec<AnchorPair> {
        self.words.iter().map(AnchorPair::identity).collect()
    }
}

/// Select anchors for aligning `source_corpus` onto `target_corpus`.
///
/// Scores each shared word by its summed count in both corpora, sorts by
/// descending score with ties broken lexicographically, then applies `cap`.
pub fn select_anchors(
    source: &VocabularyIndex,
    target: &VocabularyIndex,
    frequencies: &FrequencyTable,
    source_corpus: &str,
    target_corpus: &str,
    cap: AnchorCap,
) -> Result<AnchorList, LexAlignError> {
    if cap == AnchorCap::Limit(0) {
        return Err(LexAlignError::InvalidK(0));
    }

    let shared = source.intersection(target);
    if shared.is_empty() {
        return Err(LexAlignError::EmptyAnchorIntersection {
            source_space: source_corpus.to_string(),
            target_space: target_corpus.to_string(),
        });
    }

    let mut scored: Vec<(&str, u64)> = shared
        .into_iter()
        .map(|w| (w, frequencies.combined(source_corpus, target_corpus, w)))
        .collect();
    // Ties resolve lexicographically.
    scored.sort_by_key(|&(w, score)| (Reverse(score), w));

    if let AnchorCap::Limit(k) = cap {
        scored.truncate(k);
    }

    tracing::debug!(
        "Selected {} anchors for {} -> {}",
        scored.len(),
        source_corpus,
        target_corpus
    );

    Ok(AnchorList {
        words: scored.into_iter().map(|(w, _)| w.to_string()).collect(),
    })
}
