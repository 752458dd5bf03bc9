// crates/lexalign-core/src/error.rs

use thiserror::Error;

/// Workspace-wide error type for lexalign.
#[derive(Debug, Error)]
pub enum LexAlignError {
    /// A vocabulary index was requested over zero words.
    #[error("Empty vocabulary: cannot index an embedding space with no words")]
    EmptyVocabulary,

    /// The two vocabularies being aligned share no word.
    #[error("Empty anchor intersection: '{source_space}' and '{target_space}' share no vocabulary")]
    EmptyAnchorIntersection {
        source_space: String,
        target_space: String,
    },

    /// A word is absent from the vocabulary it was looked up in.
    #[error("Word not found: '{0}'")]
    WordNotFound(String),

    /// Too few anchors for the chosen alignment strategy.
    #[error("Underdetermined fit: {strategy} needs at least {required} anchors, got {anchors}")]
    UnderdeterminedFit {
        strategy: String,
        anchors: usize,
        required: usize,
    },

    /// A top-k or anchor cap that must be positive was not.
    #[error("Invalid k: {0} (must be positive)")]
    InvalidK(i64),

    /// Vector or matrix shapes disagree.
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A vector component is NaN or infinite.
    #[error("Non-finite vector: '{0}' has a NaN or infinite component")]
    NonFiniteVector(String),

    /// A matrix decomposition failed during fitting.
    #[error("Fit failed: {0}")]
    FitFailed(String),

    /// Malformed input file.
    #[error("Parse error in {path} at line {line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    /// Storage layer error (filesystem, aligner directory).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for LexAlignError {
    fn from(e: serde_json::Error) -> Self {
        LexAlignError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for LexAlignError {
    fn from(e: std::io::Error) -> Self {
        LexAlignError::Storage(e.to_string())
    }
}
