// crates/lexalign-align/src/lib.rs
//
// lexalign-align: Cross-space alignment and translation.
//
// Selects anchor words shared by two embedding spaces, fits one of three
// alignment strategies (orthogonal Procrustes, least-squares, CCA) on the
// anchor vectors, and binds the fitted transform into an `Aligner` that
// translates source words into ranked target-vocabulary candidates.

pub mod aligner;
pub mod anchors;
pub mod builder;
pub mod similarity;
pub mod strategy;

// Re-export key types for ergonomic access from downstream crates.
pub use aligner::{pair_name, Aligner, AlignerProvenance, Candidate, WordTranslation};
pub use anchors::{select_anchors, AnchorCap, AnchorList, AnchorPair};
pub use builder::{
    build_aligner, build_aligner_with_pairs, get_cca_aligner, get_lstsq_aligner, get_svd_aligner,
};
pub use strategy::{
    AlignmentStrategy, AlignmentTransform, Cca, CcaProjection, FitOptions, LeastSquares,
    Procrustes, Strategy,
};
