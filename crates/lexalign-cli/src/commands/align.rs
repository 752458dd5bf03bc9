// crates/lexalign-cli/src/commands/align.rs
//
// `lexalign align <SOURCE_DIR> <TARGET_DIR> <COUNTS>` builds one aligner per
// ordered pair of embedding spaces found in SOURCE_DIR and writes each as
// `{source}2{target}.aligner` into TARGET_DIR.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lexalign_align::{AnchorCap, Strategy};
use lexalign_batch::{BatchConfig, BatchDriver, BatchReport};
use lexalign_store::DirectoryStore;

use crate::config::LexalignConfig;
use crate::output::{render, OutputFormat};

/// Pairwise alignment command.
#[derive(Debug, Args)]
pub struct AlignCmd {
    /// Directory of trained embedding spaces (`.vec` / `.txt`).
    pub source_dir: PathBuf,

    /// Directory that receives the aligner files (created if missing).
    pub target_dir: PathBuf,

    /// Frequency table JSON: `{corpus: {word: count}}`.
    pub counts: PathBuf,

    /// Alignment method: svd, lstsq, or cca (default from config).
    #[arg(long)]
    pub method: Option<String>,

    /// Anchor cap; negative keeps every shared word (default from config).
    #[arg(long, allow_negative_numbers = true)]
    pub k: Option<i64>,

    /// Pairs built concurrently (default from config).
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Output format for the run report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// A row in the run report table.
#[derive(Tabled)]
struct PairRow {
    #[tabled(rename = "Aligner")]
    key: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Serialize)]
struct AlignSummary<'a> {
    method: Strategy,
    anchor_cap: AnchorCap,
    output_dir: String,
    report: &'a BatchReport,
}

fn batch_config(cmd: &AlignCmd, config: &LexalignConfig) -> Result<BatchConfig, Box<dyn std::error::Error>> {
    let method = cmd.method.clone().unwrap_or_else(|| config.method.clone());
    let strategy: Strategy = method.parse()?;
    let anchor_cap = AnchorCap::from_signed(cmd.k.unwrap_or(config.anchor_cap))?;
    Ok(BatchConfig {
        strategy,
        anchor_cap,
        fit: config.fit_options(),
        jobs: cmd.jobs.unwrap_or(config.jobs).max(1),
    })
}

fn report_rows(report: &BatchReport) -> Vec<PairRow> {
    let mut rows: Vec<PairRow> = report
        .succeeded
        .iter()
        .map(|key| PairRow {
            key: key.clone(),
            status: "ok".to_string(),
            detail: String::new(),
        })
        .chain(report.failed.iter().map(|f| PairRow {
            key: f.key.clone(),
            status: "failed".to_string(),
            detail: f.error.clone(),
        }))
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

/// Exit status of a finished run: an error when anything failed.
fn outcome(report: &BatchReport) -> Result<(), String> {
    if report.is_clean() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} aligners failed",
            report.failed.len(),
            report.total()
        ))
    }
}

/// Run the align command.
pub async fn run(cmd: &AlignCmd, config: &LexalignConfig) -> Result<(), Box<dyn std::error::Error>> {
    let batch = batch_config(cmd, config)?;
    let store = Arc::new(DirectoryStore::open(&cmd.target_dir)?);
    let output_dir = store.root().display().to_string();
    let driver = BatchDriver::new(batch, store);

    let report = driver.run_directory(&cmd.source_dir, &cmd.counts).await?;

    let summary = AlignSummary {
        method: batch.strategy,
        anchor_cap: batch.anchor_cap,
        output_dir: output_dir.clone(),
        report: &report,
    };
    println!("{}", render(cmd.format, &report_rows(&report), &summary));
    if cmd.format == OutputFormat::Table {
        println!();
        println!(
            "{} aligners written to {}, {} failed",
            report.succeeded.len(),
            output_dir,
            report.failed.len()
        );
    }

    outcome(&report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexalign_batch::BatchFailure;

    fn cmd() -> AlignCmd {
        AlignCmd {
            source_dir: PathBuf::from("in"),
            target_dir: PathBuf::from("out"),
            counts: PathBuf::from("counts.json"),
            method: None,
            k: None,
            jobs: None,
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn flags_override_config() {
        let mut c = cmd();
        c.method = Some("cca".to_string());
        c.k = Some(100);
        c.jobs = Some(0);
        let batch = batch_config(&c, &LexalignConfig::default()).unwrap();
        assert_eq!(batch.strategy, Strategy::Cca);
        assert_eq!(batch.anchor_cap, AnchorCap::Limit(100));
        assert_eq!(batch.jobs, 1);
    }

    #[test]
    fn config_supplies_defaults() {
        let batch = batch_config(&cmd(), &LexalignConfig::default()).unwrap();
        assert_eq!(batch.strategy, Strategy::Procrustes);
        assert_eq!(batch.anchor_cap, AnchorCap::Unbounded);
        assert_eq!(batch.jobs, 4);
    }

    #[test]
    fn zero_cap_and_unknown_method_are_rejected() {
        let mut c = cmd();
        c.k = Some(0);
        assert!(batch_config(&c, &LexalignConfig::default()).is_err());
        let mut c = cmd();
        c.method = Some("pca".to_string());
        assert!(batch_config(&c, &LexalignConfig::default()).is_err());
    }

    #[test]
    fn report_rows_are_sorted_across_outcomes() {
        let report = BatchReport {
            succeeded: vec!["b2a".to_string()],
            failed: vec![BatchFailure {
                key: "a2c".to_string(),
                error: "no shared words".to_string(),
            }],
        };
        let rows = report_rows(&report);
        assert_eq!(rows[0].key, "a2c");
        assert_eq!(rows[0].status, "failed");
        assert_eq!(rows[1].key, "b2a");
    }

    #[test]
    fn any_failure_makes_the_run_fail() {
        let mut report = BatchReport {
            succeeded: vec!["a2b".to_string(), "b2a".to_string()],
            failed: Vec::new(),
        };
        assert!(outcome(&report).is_ok());

        report.failed.push(BatchFailure {
            key: "c.vec".to_string(),
            error: "Parse error".to_string(),
        });
        assert_eq!(outcome(&report).unwrap_err(), "1 of 3 aligners failed");
    }
}
