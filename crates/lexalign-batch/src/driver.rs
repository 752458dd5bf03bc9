// crates/lexalign-batch/src/driver.rs
//
// Pairwise batch driver.
//
// For n spaces there are n * (n - 1) ordered pairs. Each pair is built on
// the blocking pool and persisted as `{source}2{target}`. A pair that fails
// (no shared vocabulary, underdetermined fit, write error) is logged and
// recorded in the report; the remaining pairs still run.
//
// Space names are pair-key components, so they must be unique. A second
// space with an already-seen name is reported as a failure and left out.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use lexalign_align::{build_aligner, pair_name, AnchorCap, FitOptions, Strategy};
use lexalign_core::{EmbeddingSpace, FrequencyTable, LexAlignError};
use lexalign_store::{discover_spaces, load_frequency_table, load_space, AlignerStore};

/// Settings for one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub strategy: Strategy,
    pub anchor_cap: AnchorCap,
    pub fit: FitOptions,
    /// Maximum pairs built concurrently (at least 1).
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Procrustes,
            anchor_cap: AnchorCap::Unbounded,
            fit: FitOptions::default(),
            jobs: 4,
        }
    }
}

/// A pair (or input file) that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub key: String,
    pub error: String,
}

/// Outcome of a batch run, keys sorted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Every ordered `(i, j)` with `i != j` over `n` items, row-major.
pub fn ordered_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect()
}

/// Builds one aligner per ordered pair and writes it to a store.
pub struct BatchDriver {
    config: BatchConfig,
    store: Arc<dyn AlignerStore>,
}

impl BatchDriver {
    pub fn new(config: BatchConfig, store: Arc<dyn AlignerStore>) -> Self {
        Self { config, store }
    }

    /// Load every space in `source_dir` and the counts at `counts_path`,
    /// then run all pairs.
    ///
    /// An unreadable frequency table aborts the run. An unreadable space
    /// file, or one whose stem repeats an earlier file's (`a.txt` and
    /// `a.vec`), is reported under its file name and left out of the
    /// pairing. Discovery order is sorted, so the first file wins.
    pub async fn run_directory(
        &self,
        source_dir: &Path,
        counts_path: &Path,
    ) -> Result<BatchReport, LexAlignError> {
        let frequencies = load_frequency_table(counts_path)?;
        let paths = discover_spaces(source_dir)?;
        tracing::info!(
            "Discovered {} embedding spaces in {}",
            paths.len(),
            source_dir.display()
        );

        let mut spaces = Vec::with_capacity(paths.len());
        let mut loaded_from: HashMap<String, String> = HashMap::new();
        let mut load_failures = Vec::new();
        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            match load_space(&path) {
                Ok(space) => {
                    if let Some(first) = loaded_from.get(space.name()) {
                        tracing::warn!(
                            "Skipping {}: corpus '{}' already loaded from {}",
                            path.display(),
                            space.name(),
                            first
                        );
                        load_failures.push(BatchFailure {
                            key: file_name,
                            error: format!(
                                "Duplicate corpus name '{}' (already loaded from {})",
                                space.name(),
                                first
                            ),
                        });
                        continue;
                    }
                    loaded_from.insert(space.name().to_string(), file_name);
                    spaces.push(space);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    load_failures.push(BatchFailure {
                        key: file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut report = self.run(spaces, frequencies).await;
        report.failed.extend(load_failures);
        report.failed.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(report)
    }

    /// Build and persist every ordered pair of `spaces`.
    ///
    /// A space whose name repeats an earlier one is recorded as a failure
    /// under that name and not paired.
    pub async fn run(&self, spaces: Vec<EmbeddingSpace>, frequencies: FrequencyTable) -> BatchReport {
        let mut report = BatchReport::default();
        let mut unique: Vec<Arc<EmbeddingSpace>> = Vec::with_capacity(spaces.len());
        for space in spaces {
            if unique.iter().any(|s| s.name() == space.name()) {
                tracing::warn!("Skipping duplicate space '{}'", space.name());
                report.failed.push(BatchFailure {
                    key: space.name().to_string(),
                    error: format!("Duplicate corpus name '{}'", space.name()),
                });
                continue;
            }
            unique.push(Arc::new(space));
        }
        let spaces = unique;
        let frequencies = Arc::new(frequencies);
        let permits = Arc::new(Semaphore::new(self.config.jobs.max(1)));
        let pairs = ordered_pairs(spaces.len());

        tracing::info!(
            "Aligning {} ordered pairs with {} (anchor cap {:?}, {} jobs)",
            pairs.len(),
            self.config.strategy,
            self.config.anchor_cap,
            self.config.jobs.max(1)
        );

        let mut tasks = JoinSet::new();
        let mut pending = HashSet::new();
        for (i, j) in pairs {
            let source = Arc::clone(&spaces[i]);
            let target = Arc::clone(&spaces[j]);
            let frequencies = Arc::clone(&frequencies);
            let permits = Arc::clone(&permits);
            let store = Arc::clone(&self.store);
            let config = self.config;

            let key = pair_name(source.name(), target.name());
            pending.insert(key.clone());

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (key, Err(LexAlignError::Storage(format!("Semaphore closed: {}", e))))
                    }
                };
                // Own task per pair: a panic surfaces here under its key.
                let pair_key = key.clone();
                let pair = tokio::spawn(async move {
                    build_and_save(config, source, target, frequencies, store, &pair_key).await
                });
                let result = match pair.await {
                    Ok(result) => result,
                    Err(e) => Err(LexAlignError::Storage(format!("Pair task panicked: {}", e))),
                };
                (key, result)
            });
        }

        let mut aborted = None;
        while let Some(joined) = tasks.join_next().await {
            if let Ok((key, _)) = &joined {
                pending.remove(key);
            }
            match joined {
                Ok((key, Ok(()))) => {
                    tracing::info!("Built aligner {}", key);
                    report.succeeded.push(key);
                }
                Ok((key, Err(e))) => {
                    tracing::warn!("Failed to build aligner {}: {}", key, e);
                    report.failed.push(BatchFailure {
                        key,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!("Batch task aborted: {}", e);
                    aborted = Some(e.to_string());
                }
            }
        }
        if let Some(error) = aborted {
            for key in pending {
                report.failed.push(BatchFailure {
                    key,
                    error: format!("Batch task aborted: {}", error),
                });
            }
        }

        report.succeeded.sort();
        report.failed.sort_by(|a, b| a.key.cmp(&b.key));
        tracing::info!(
            "Batch complete: {} built, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }
}

async fn build_and_save(
    config: BatchConfig,
    source: Arc<EmbeddingSpace>,
    target: Arc<EmbeddingSpace>,
    frequencies: Arc<FrequencyTable>,
    store: Arc<dyn AlignerStore>,
    key: &str,
) -> Result<(), LexAlignError> {
    let aligner = tokio::task::spawn_blocking(move || {
        build_aligner(
            config.strategy,
            &config.fit,
            (*source).clone(),
            (*target).clone(),
            &frequencies,
            config.anchor_cap,
        )
    })
    .await
    .map_err(|e| LexAlignError::FitFailed(format!("Pair task panicked: {}", e)))??;
    store.save_aligner(key, &aligner).await
}
