// crates/lexalign-align/src/aligner.rs
//
// The Aligner: a fitted transform bound to its source and target spaces.
//
// Translation is encode -> transform -> decode:
//   - encode looks up source rows by exact word,
//   - transform maps them into the comparison space,
//   - decode ranks every target word by cosine similarity.
// An Aligner is never mutated after fitting, so every operation takes
// `&self` and one instance can serve many threads.

use chrono::{DateTime, Utc};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use lexalign_core::{EmbeddingSpace, LexAlignError};

use crate::anchors::AnchorPair;
use crate::similarity::{cosine_similarity_matrix, top_k};
use crate::strategy::{AlignmentTransform, FitOptions, Strategy};

/// Where an aligner came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignerProvenance {
    pub source: String,
    pub target: String,
    /// `EmbeddingSpace::fingerprint` of the source space at fit time.
    pub source_fingerprint: String,
    pub target_fingerprint: String,
    pub built_at: DateTime<Utc>,
}

/// One ranked translation candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub word: String,
    pub similarity: f32,
}

/// Outcome for one word of a batch translation request.
#[derive(Debug)]
pub struct WordTranslation {
    pub word: String,
    pub result: Result<Vec<Candidate>, LexAlignError>,
}

/// A fitted mapping from one embedding space into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aligner {
    strategy: Strategy,
    transform: AlignmentTransform,
    source: EmbeddingSpace,
    target: EmbeddingSpace,
    anchors: Vec<AnchorPair>,
    provenance: AlignerProvenance,
}

impl Aligner {
    /// Fit `strategy` on `anchors` and bind the result to both spaces.
    ///
    /// Anchor vectors are stacked in anchor order. Fails if `anchors` is
    /// empty or names a word missing from either space.
    pub fn fit(
        strategy: Strategy,
        options: &FitOptions,
        source: EmbeddingSpace,
        target: EmbeddingSpace,
        anchors: Vec<AnchorPair>,
    ) -> Result<Self, LexAlignError> {
        if anchors.is_empty() {
            return Err(LexAlignError::EmptyAnchorIntersection {
                source_space: source.name().to_string(),
                target_space: target.name().to_string(),
            });
        }

        let source_words: Vec<&str> = anchors.iter().map(|p| p.source.as_str()).collect();
        let target_words: Vec<&str> = anchors.iter().map(|p| p.target.as_str()).collect();
        let a = source.rows_for(&source_words[..])?.map(f64::from);
        let b = target.rows_for(&target_words[..])?.map(f64::from);

        let transform = strategy.fitter(options).fit(&a, &b)?;

        let provenance = AlignerProvenance {
            source: source.name().to_string(),
            target: target.name().to_string(),
            source_fingerprint: source.fingerprint(),
            target_fingerprint: target.fingerprint(),
            built_at: Utc::now(),
        };

        tracing::debug!(
            "Fitted {} aligner {} -> {} on {} anchors",
            strategy,
            source.name(),
            target.name(),
            anchors.len()
        );

        Ok(Self {
            strategy,
            transform,
            source,
            target,
            anchors,
            provenance,
        })
    }

    /// Storage key: `"{source}2{target}"`.
    pub fn name(&self) -> String {
        pair_name(self.source.name(), self.target.name())
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn transform_params(&self) -> &AlignmentTransform {
        &self.transform
    }

    pub fn source(&self) -> &EmbeddingSpace {
        &self.source
    }

    pub fn target(&self) -> &EmbeddingSpace {
        &self.target
    }

    /// The anchors the transform was fit on. Not used at inference time.
    pub fn anchors(&self) -> &[AnchorPair] {
        &self.anchors
    }

    pub fn provenance(&self) -> &AlignerProvenance {
        &self.provenance
    }

    /// Source-space rows for `words`, by exact match.
    pub fn encode_input<S: AsRef<str>>(&self, words: &[S]) -> Result<DMatrix<f64>, LexAlignError> {
        Ok(self.source.rows_for(words)?.map(f64::from))
    }

    /// Map encoded source rows into the comparison space.
    pub fn transform(&self, encoded: &DMatrix<f64>) -> DMatrix<f64> {
        self.transform.apply(encoded)
    }

    /// Rank target words for each transformed row, best `k` first.
    ///
    /// For CCA the target matrix is projected into canonical space as a
    /// local value for this call only.
    pub fn decode_output(
        &self,
        transformed: &DMatrix<f64>,
        k: usize,
    ) -> Result<Vec<Vec<Candidate>>, LexAlignError> {
        if k == 0 {
            return Err(LexAlignError::InvalidK(0));
        }

        let target = self.target.vectors().map(f64::from);
        let candidates = self.transform.project_target(&target);
        if transformed.ncols() != candidates.ncols() {
            return Err(LexAlignError::DimensionMismatch {
                expected: candidates.ncols(),
                found: transformed.ncols(),
            });
        }

        let sims = cosine_similarity_matrix(transformed, &candidates);
        let index = self.target.index();
        let ranked = sims
            .row_iter()
            .map(|row| {
                top_k(row.iter().copied(), k)
                    .into_iter()
                    .filter_map(|(id, score)| {
                        index.word(id).map(|w| Candidate {
                            word: w.to_string(),
                            similarity: score as f32,
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(ranked)
    }

    /// Top-`k` target words for one source word.
    pub fn translate_word(&self, word: &str, k: usize) -> Result<Vec<Candidate>, LexAlignError> {
        if k == 0 {
            return Err(LexAlignError::InvalidK(0));
        }
        let encoded = self.encode_input(&[word])?;
        let mut decoded = self.decode_output(&self.transform(&encoded), k)?;
        Ok(decoded.pop().unwrap_or_default())
    }

    /// Top-`k` target words for each of `words`, in request order.
    ///
    /// A word missing from the source vocabulary gets its own
    /// `WordNotFound` outcome; the rest are still translated.
    pub fn translate_words<S: AsRef<str>>(
        &self,
        words: &[S],
        k: usize,
    ) -> Result<Vec<WordTranslation>, LexAlignError> {
        if k == 0 {
            return Err(LexAlignError::InvalidK(0));
        }

        let known: Vec<&str> = words
            .iter()
            .map(|w| w.as_ref())
            .filter(|w| self.source.contains(w))
            .collect();

        let decoded = if known.is_empty() {
            Vec::new()
        } else {
            let encoded = self.encode_input(&known[..])?;
            self.decode_output(&self.transform(&encoded), k)?
        };
        let mut decoded = decoded.into_iter();

        let outcomes = words
            .iter()
            .map(|w| w.as_ref())
            .map(|w| {
                let result = if self.source.contains(w) {
                    Ok(decoded.next().unwrap_or_default())
                } else {
                    Err(LexAlignError::WordNotFound(w.to_string()))
                };
                WordTranslation {
                    word: w.to_string(),
                    result,
                }
            })
            .collect();
        Ok(outcomes)
    }
}

/// Storage key for an ordered corpus pair.
pub fn pair_name(source: &str, target: &str) -> String {
    format!("{}2{}", source, target)
}
