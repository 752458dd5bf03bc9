// crates/lexalign-cli/src/commands/mod.rs
//
// Command module declarations for the lexalign CLI.

pub mod align;
pub mod anchors;
pub mod inspect;
pub mod translate;
