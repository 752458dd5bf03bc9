// crates/lexalign-cli/src/commands/inspect.rs
//
// `lexalign inspect <ALIGNER>` prints what a saved aligner was built from.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use lexalign_align::{Aligner, AlignmentTransform, Strategy};
use lexalign_store::DirectoryStore;

use crate::output::{format_json, OutputFormat};

/// Aligner inspection command.
#[derive(Debug, Args)]
pub struct InspectCmd {
    /// Path to a saved `.aligner` file.
    pub aligner: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct SpaceSummary {
    name: String,
    words: usize,
    dims: usize,
    fingerprint: String,
}

#[derive(Debug, Serialize)]
struct AlignerSummary {
    key: String,
    strategy: Strategy,
    built_at: String,
    source: SpaceSummary,
    target: SpaceSummary,
    anchors: usize,
    first_anchors: Vec<String>,
    comparison_dims: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical_correlations: Option<Vec<f64>>,
}

const ANCHOR_PREVIEW: usize = 10;

fn summarize(aligner: &Aligner) -> AlignerSummary {
    let provenance = aligner.provenance();
    let space = |s: &lexalign_core::EmbeddingSpace, fingerprint: &str| SpaceSummary {
        name: s.name().to_string(),
        words: s.len(),
        dims: s.dims(),
        fingerprint: fingerprint.to_string(),
    };
    let canonical_correlations = match aligner.transform_params() {
        AlignmentTransform::Canonical(p) => Some(p.correlations.iter().copied().collect()),
        AlignmentTransform::Linear(_) => None,
    };

    AlignerSummary {
        key: aligner.name(),
        strategy: aligner.strategy(),
        built_at: provenance.built_at.to_rfc3339(),
        source: space(aligner.source(), &provenance.source_fingerprint),
        target: space(aligner.target(), &provenance.target_fingerprint),
        anchors: aligner.anchors().len(),
        first_anchors: aligner
            .anchors()
            .iter()
            .take(ANCHOR_PREVIEW)
            .map(|p| {
                if p.source == p.target {
                    p.source.clone()
                } else {
                    format!("{}={}", p.source, p.target)
                }
            })
            .collect(),
        comparison_dims: aligner.transform_params().output_dims(),
        canonical_correlations,
    }
}

fn print_summary(summary: &AlignerSummary) {
    println!("Aligner {}", summary.key);
    println!("-----------");
    println!("  Strategy:     {}", summary.strategy);
    println!("  Built at:     {}", summary.built_at);
    for (label, s) in [("Source", &summary.source), ("Target", &summary.target)] {
        println!(
            "  {}:       {} ({} words, {} dims, sha256 {})",
            label, s.name, s.words, s.dims, s.fingerprint
        );
    }
    println!("  Anchors:      {}", summary.anchors);
    if !summary.first_anchors.is_empty() {
        println!("  First:        {}", summary.first_anchors.join(", "));
    }
    println!("  Compared in:  {} dims", summary.comparison_dims);
    if let Some(corr) = &summary.canonical_correlations {
        let shown: Vec<String> = corr.iter().map(|c| format!("{:.4}", c)).collect();
        println!("  Correlations: {}", shown.join(", "));
    }
}

/// Run the inspect command.
pub async fn run(cmd: &InspectCmd) -> Result<(), Box<dyn std::error::Error>> {
    let aligner = DirectoryStore::read_file(&cmd.aligner)?;
    let summary = summarize(&aligner);
    match cmd.format {
        OutputFormat::Table => print_summary(&summary),
        OutputFormat::Json => println!("{}", format_json(&summary)),
    }
    Ok(())
}
