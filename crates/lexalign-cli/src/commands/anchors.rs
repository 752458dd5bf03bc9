// crates/lexalign-cli/src/commands/anchors.rs
//
// `lexalign anchors <SOURCE> <TARGET> <COUNTS>` previews the ranked anchor
// words that `align` would use for one ordered pair.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lexalign_align::{select_anchors, AnchorCap, AnchorList};
use lexalign_core::FrequencyTable;
use lexalign_store::{load_frequency_table, load_space};

use crate::config::LexalignConfig;
use crate::output::{render, OutputFormat};

/// Anchor preview command.
#[derive(Debug, Args)]
pub struct AnchorsCmd {
    /// Source embedding space file.
    pub source: PathBuf,

    /// Target embedding space file.
    pub target: PathBuf,

    /// Frequency table JSON.
    pub counts: PathBuf,

    /// Anchor cap; negative keeps every shared word (default from config).
    #[arg(long, allow_negative_numbers = true)]
    pub k: Option<i64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// A row in the anchor table.
#[derive(Tabled, Serialize)]
struct AnchorRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Word")]
    word: String,
    #[tabled(rename = "Source Count")]
    source_count: u64,
    #[tabled(rename = "Target Count")]
    target_count: u64,
    #[tabled(rename = "Combined")]
    combined: u64,
}

fn anchor_rows(
    anchors: &AnchorList,
    frequencies: &FrequencyTable,
    source: &str,
    target: &str,
) -> Vec<AnchorRow> {
    anchors
        .words()
        .iter()
        .enumerate()
        .map(|(i, word)| AnchorRow {
            rank: i + 1,
            word: word.clone(),
            source_count: frequencies.count(source, word),
            target_count: frequencies.count(target, word),
            combined: frequencies.combined(source, target, word),
        })
        .collect()
}

/// Run the anchors command.
pub async fn run(cmd: &AnchorsCmd, config: &LexalignConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cap = AnchorCap::from_signed(cmd.k.unwrap_or(config.anchor_cap))?;
    let source = load_space(&cmd.source)?;
    let target = load_space(&cmd.target)?;
    let frequencies = load_frequency_table(&cmd.counts)?;

    for corpus in [source.name(), target.name()] {
        if !frequencies.has_corpus(corpus) {
            tracing::warn!("No counts for corpus '{}'; its words score 0", corpus);
        }
    }

    let anchors = select_anchors(
        source.index(),
        target.index(),
        &frequencies,
        source.name(),
        target.name(),
        cap,
    )?;
    let rows = anchor_rows(&anchors, &frequencies, source.name(), target.name());
    println!("{}", render(cmd.format, &rows, &rows));
    if cmd.format == OutputFormat::Table {
        println!();
        println!(
            "{} anchors for {} -> {} ({} shared words)",
            anchors.len(),
            source.name(),
            target.name(),
            source.index().intersection(target.index()).len()
        );
    }

    Ok(())
}
