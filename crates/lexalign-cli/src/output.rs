// crates/lexalign-cli/src/output.rs
//
// Output formatting utilities for the lexalign CLI.
// Supports table and JSON output modes.

use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    #[default]
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Render `rows` as a table, or `json` as JSON, depending on `format`.
pub fn render<T: Tabled, J: Serialize>(format: OutputFormat, rows: &[T], json: &J) -> String {
    match format {
        OutputFormat::Table => format_table(rows),
        OutputFormat::Json => format_json(json),
    }
}

/// Similarities shown with a fixed precision in tables.
pub fn similarity(value: f32) -> String {
    format!("{:.4}", value)
}
