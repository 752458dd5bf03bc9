// crates/lexalign-core/src/embedding.rs
//
// Immutable (vocabulary -> vector) embedding space for one corpus.

use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::LexAlignError;
use crate::vocabulary::VocabularyIndex;

/// A trained word-vector space.
///
/// Row `i` of `vectors` is the vector of `index.word(i)`. The space is
/// created once from a trained model and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSpace {
    name: String,
    index: VocabularyIndex,
    vectors: DMatrix<f32>,
}

impl EmbeddingSpace {
    /// Build a space from `(word, vector)` rows in any order.
    ///
    /// Rows are re-ordered lexicographically by word. A word appearing
    /// twice keeps its last vector. Every vector must share the length of
    /// the first one and hold only finite components.
    pub fn from_rows<I, S>(name: impl Into<String>, rows: I) -> Result<Self, LexAlignError>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let sorted: BTreeMap<String, Vec<f32>> =
            rows.into_iter().map(|(w, v)| (w.into(), v)).collect();

        let dims = match sorted.values().next() {
            Some(first) => first.len(),
            None => return Err(LexAlignError::EmptyVocabulary),
        };
        if dims == 0 {
            return Err(LexAlignError::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }

        let mut data = Vec::with_capacity(sorted.len() * dims);
        for (word, vector) in &sorted {
            if vector.len() != dims {
                return Err(LexAlignError::DimensionMismatch {
                    expected: dims,
                    found: vector.len(),
                });
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(LexAlignError::NonFiniteVector(word.clone()));
            }
            data.extend_from_slice(vector);
        }

        let vectors = DMatrix::from_row_slice(sorted.len(), dims, &data);
        let index = VocabularyIndex::new(sorted.into_keys())?;

        Ok(Self {
            name: name.into(),
            index,
            vectors,
        })
    }

    /// Corpus name (file stem of the trained model).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &VocabularyIndex {
        &self.index
    }

    /// The full `len() x dims()` vector matrix in index order.
    pub fn vectors(&self) -> &DMatrix<f32> {
        &self.vectors
    }

    pub fn dims(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    /// A copy of the vector of `word`, or `WordNotFound`.
    pub fn vector(&self, word: &str) -> Result<Vec<f32>, LexAlignError> {
        let id = self
            .index
            .id(word)
            .ok_or_else(|| LexAlignError::WordNotFound(word.to_string()))?;
        Ok(self.vectors.row(id).iter().copied().collect())
    }

    /// Stack the rows of `words` (in the given order) into a matrix.
    pub fn rows_for<S: AsRef<str>>(&self, words: &[S]) -> Result<DMatrix<f32>, LexAlignError> {
        let ids = words
            .iter()
            .map(|w| {
                let w = w.as_ref();
                self.index
                    .id(w)
                    .ok_or_else(|| LexAlignError::WordNotFound(w.to_string()))
            })
            .collect::<Result<Vec<usize>, _>>()?;
        Ok(self.vectors.select_rows(ids.iter()))
    }

    /// SHA-256 over every (word, vector) row in index order, hex-encoded.
    ///
    /// Two spaces with the same fingerprint translate identically.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, word) in self.index.words().iter().enumerate() {
            hasher.update((word.len() as u64).to_le_bytes());
            hasher.update(word.as_bytes());
            for value in self.vectors.row(i).iter() {
                hasher.update(value.to_le_bytes());
            }
        }
        hex::encode(hasher.finalize())
    }
}
