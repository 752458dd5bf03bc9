// crates/lexalign-store/src/counts.rs
//
// Frequency table loading: `{corpus_name: {word: count}}` JSON.

use std::fs;
use std::path::Path;

use lexalign_core::{FrequencyTable, LexAlignError};

/// Read and parse a frequency table file.
pub fn load_frequency_table(path: &Path) -> Result<FrequencyTable, LexAlignError> {
    let json = fs::read_to_string(path).map_err(|e| {
        LexAlignError::Storage(format!(
            "Failed to read frequency table {}: {}",
            path.display(),
            e
        ))
    })?;
    let table = FrequencyTable::from_json(&json)?;
    tracing::info!(
        "Loaded frequency table from {} ({} corpora)",
        path.display(),
        table.corpora().len()
    );
    Ok(table)
}
