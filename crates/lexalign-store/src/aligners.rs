// crates/lexalign-store/src/aligners.rs
//
// Persistent storage for fitted aligners.
//
// Key format: `{source}2{target}` (see `lexalign_align::pair_name`).
// `DirectoryStore` writes one bincode file per key, `{key}.aligner`, so a
// batch run leaves a directory with one file per ordered pair.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

use lexalign_align::Aligner;
use lexalign_core::LexAlignError;

/// File extension for persisted aligners.
pub const ALIGNER_EXTENSION: &str = "aligner";

/// Trait for aligner persistence.
#[async_trait]
pub trait AlignerStore: Send + Sync {
    /// Save an aligner under `key`. Overwrites if the key already exists.
    async fn save_aligner(&self, key: &str, aligner: &Aligner) -> Result<(), LexAlignError>;

    /// Retrieve an aligner by key.
    async fn load_aligner(&self, key: &str) -> Result<Option<Aligner>, LexAlignError>;

    /// All stored keys, sorted.
    async fn list_keys(&self) -> Result<Vec<String>, LexAlignError>;
}

/// Serialize an aligner to bincode bytes.
pub fn encode_aligner(aligner: &Aligner) -> Result<Vec<u8>, LexAlignError> {
    bincode::serialize(aligner).map_err(|e| LexAlignError::Serialization(e.to_string()))
}

/// Deserialize an aligner from bincode bytes.
pub fn decode_aligner(bytes: &[u8]) -> Result<Aligner, LexAlignError> {
    bincode::deserialize(bytes).map_err(|e| LexAlignError::Serialization(e.to_string()))
}

/// Aligners stored as `{key}.aligner` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LexAlignError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            LexAlignError::Storage(format!(
                "Failed to create aligner directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, ALIGNER_EXTENSION))
    }

    /// Write an aligner to an explicit file path.
    pub fn write_file(path: &Path, aligner: &Aligner) -> Result<(), LexAlignError> {
        let file = File::create(path).map_err(|e| {
            LexAlignError::Storage(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, aligner)
            .map_err(|e| LexAlignError::Serialization(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    /// Read an aligner from an explicit file path.
    pub fn read_file(path: &Path) -> Result<Aligner, LexAlignError> {
        let file = File::open(path).map_err(|e| {
            LexAlignError::Storage(format!("Failed to open {}: {}", path.display(), e))
        })?;
        bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| LexAlignError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl AlignerStore for DirectoryStore {
    async fn save_aligner(&self, key: &str, aligner: &Aligner) -> Result<(), LexAlignError> {
        let path = self.path_for(key);
        let aligner = aligner.clone();
        let written = path.clone();
        blocking(move || Self::write_file(&written, &aligner)).await?;
        tracing::debug!("Saved aligner {} to {}", key, path.display());
        Ok(())
    }

    async fn load_aligner(&self, key: &str) -> Result<Option<Aligner>, LexAlignError> {
        let path = self.path_for(key);
        blocking(move || {
            if !path.exists() {
                return Ok(None);
            }
            Self::read_file(&path).map(Some)
        })
        .await
    }

    async fn list_keys(&self) -> Result<Vec<String>, LexAlignError> {
        let root = self.root.clone();
        blocking(move || {
            let mut keys = Vec::new();
            for entry in fs::read_dir(&root)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some(ALIGNER_EXTENSION) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }
}

/// Run filesystem work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, LexAlignError>
where
    F: FnOnce() -> Result<T, LexAlignError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| LexAlignError::Storage(format!("Storage task failed: {}", e)))?
}

/// In-memory aligner store holding bincode bytes, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryAlignerStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryAlignerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AlignerStore for InMemoryAlignerStore {
    async fn save_aligner(&self, key: &str, aligner: &Aligner) -> Result<(), LexAlignError> {
        let bytes = encode_aligner(aligner)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| LexAlignError::Storage(format!("RwLock poisoned: {}", e)))?;
        entries.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn load_aligner(&self, key: &str) -> Result<Option<Aligner>, LexAlignError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| LexAlignError::Storage(format!("RwLock poisoned: {}", e)))?;
        entries.get(key).map(|bytes| decode_aligner(bytes)).transpose()
    }

    async fn list_keys(&self) -> Result<Vec<String>, LexAlignError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| LexAlignError::Storage(format!("RwLock poisoned: {}", e)))?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
