// crates/lexalign-store/src/lib.rs
//
// lexalign-store: On-disk formats for the lexalign workspace.
//
// Loads trained embedding spaces from word2vec text files, loads the
// per-corpus frequency table from JSON, and persists fitted aligners as
// bincode files keyed `{source}2{target}` behind the `AlignerStore` trait.

pub mod aligners;
pub mod counts;
pub mod spaces;

// Re-export key types for ergonomic access from downstream crates.
pub use aligners::{AlignerStore, DirectoryStore, InMemoryAlignerStore};
pub use counts::load_frequency_table;
pub use spaces::{discover_spaces, load_space, save_space};
