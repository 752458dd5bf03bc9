// crates/lexalign-cli/src/config.rs
//
// Runtime configuration for the lexalign CLI.
// Loaded from a TOML file or populated with defaults; command-line flags
// override individual fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use lexalign_align::{AnchorCap, FitOptions, Strategy};
use lexalign_core::LexAlignError;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LexalignConfig {
    /// Alignment strategy: "svd", "lstsq", or "cca".
    #[serde(default = "default_method")]
    pub method: String,

    /// Anchor cap; negative keeps every shared word.
    #[serde(default = "default_anchor_cap")]
    pub anchor_cap: i64,

    /// Pairs built concurrently by `align`.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Ridge added to each CCA covariance diagonal.
    #[serde(default = "default_cca_regularization")]
    pub cca_regularization: f64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Candidates returned per word by `translate`.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_method() -> String {
    "svd".to_string()
}

fn default_anchor_cap() -> i64 {
    -1
}

fn default_jobs() -> usize {
    4
}

fn default_cca_regularization() -> f64 {
    lexalign_align::strategy::DEFAULT_CCA_REGULARIZATION
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_top_k() -> usize {
    5
}

impl Default for LexalignConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            anchor_cap: default_anchor_cap(),
            jobs: default_jobs(),
            cca_regularization: default_cca_regularization(),
            log_level: default_log_level(),
            top_k: default_top_k(),
        }
    }
}

impl LexalignConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: LexalignConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// `~/.lexalign/config.toml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".lexalign").join("config.toml"))
    }

    pub fn strategy(&self) -> Result<Strategy, String> {
        self.method.parse()
    }

    pub fn anchor_cap(&self) -> Result<AnchorCap, LexAlignError> {
        AnchorCap::from_signed(self.anchor_cap)
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            cca_regularization: self.cca_regularization,
        }
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
