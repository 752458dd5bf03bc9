// crates/lexalign-cli/src/main.rs
//
// CLI entrypoint for lexalign.
//
// Aligns trained word-vector spaces pairwise, translates words through a
// saved aligner, previews anchor selection, and prints aligner provenance.

mod commands;
mod config;
mod output;

use clap::{Parser, Subcommand};
use commands::align::AlignCmd;
use commands::anchors::AnchorsCmd;
use commands::inspect::InspectCmd;
use commands::translate::TranslateCmd;
use config::LexalignConfig;

/// lexalign: cross-corpus word-vector alignment and translation.
#[derive(Parser, Debug)]
#[command(
    name = "lexalign",
    version = "0.1.0",
    about = "Align word-vector spaces trained on different corpora and translate words between them"
)]
struct Cli {
    /// Path to the TOML configuration file (default: ~/.lexalign/config.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level override: trace, debug, info, warn, error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Build an aligner for every ordered pair of spaces in a directory.
    Align(AlignCmd),

    /// Translate words through a saved aligner.
    Translate(TranslateCmd),

    /// Show the anchors that would be selected for two spaces.
    Anchors(AnchorsCmd),

    /// Print the provenance and parameters of a saved aligner.
    Inspect(InspectCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => Some(config::expand_home(path)),
        None => LexalignConfig::default_path(),
    };
    let loaded = config_path
        .as_deref()
        .map(|path| (path, LexalignConfig::load(path)));

    let config = match &loaded {
        Some((_, Ok(cfg))) => cfg.clone(),
        _ => LexalignConfig::default(),
    };

    // RUST_LOG wins over the flag, the flag over the config file.
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &loaded {
        Some((path, Ok(_))) => {
            tracing::info!("Loaded configuration from {}", path.display());
        }
        Some((path, Err(e))) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                path.display(),
                e
            );
        }
        None => {
            tracing::warn!("Could not determine home directory. Using default configuration.");
        }
    }

    match &cli.command {
        Commands::Align(cmd) => commands::align::run(cmd, &config).await?,
        Commands::Translate(cmd) => commands::translate::run(cmd, &config).await?,
        Commands::Anchors(cmd) => commands::anchors::run(cmd, &config).await?,
        Commands::Inspect(cmd) => commands::inspect::run(cmd).await?,
    }

    Ok(())
}
