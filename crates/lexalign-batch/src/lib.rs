// crates/lexalign-batch/src/lib.rs
//
// lexalign-batch: Build and persist an aligner for every ordered pair of
// trained embedding spaces.

pub mod driver;

pub use driver::{ordered_pairs, BatchConfig, BatchDriver, BatchFailure, BatchReport};
