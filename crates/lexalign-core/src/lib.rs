// crates/lexalign-core/src/lib.rs
//
// lexalign-core: Core types for cross-corpus embedding alignment.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the vocabulary index, the immutable embedding space, the
// read-only frequency table, and the workspace-wide error type.

pub mod embedding;
pub mod error;
pub mod frequency;
pub mod vocabulary;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use lexalign_core::EmbeddingSpace;`

pub use embedding::EmbeddingSpace;
pub use error::LexAlignError;
pub use frequency::FrequencyTable;
pub use vocabulary::VocabularyIndex;
