use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the local-persisted backend. The prefix only affects
/// slot naming, letting several stores share one directory.
#[derive(Debug, Clone)]
pub struct JsonStoreConfig {
    pub base_dir: PathBuf,
    pub collection_prefix: String,
}

impl JsonStoreConfig {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            collection_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.collection_prefix = prefix.into();
        self
    }
}

/// JsonConnection manages the data directory and slot files for the
/// local-persisted backend.
#[derive(Clone)]
pub struct JsonConnection {
    base_dir: PathBuf,
    prefix: String,
}

impl JsonConnection {
    /// Open a connection, creating the base directory if it doesn't exist.
    pub fn open(config: &JsonStoreConfig) -> Result<Self> {
        if !config.base_dir.exists() {
            fs::create_dir_all(&config.base_dir).with_context(|| {
                format!("failed to create data directory {}", config.base_dir.display())
            })?;
        }
        Ok(Self {
            base_dir: config.base_dir.clone(),
            prefix: config.collection_prefix.clone(),
        })
    }

    /// Slot file for a collection.
    pub fn slot_path(&self, collection: &str) -> PathBuf {
        self.base_dir.join(format!("{}{}.json", self.prefix, collection))
    }

    /// Load a collection's full record sequence. A missing slot is an empty
    /// collection; an unreadable or corrupt slot is an error, never silent
    /// data loss.
    pub fn load<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let path = self.slot_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read slot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("slot {} holds unreadable data", path.display()))
    }

    /// Rewrite a collection's slot with the full record sequence, using a
    /// temp file and rename so a crash mid-write leaves the old slot intact.
    pub fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<()> {
        let path = self.slot_path(collection);
        let raw = serde_json::to_string_pretty(records)
            .with_context(|| format!("failed to serialize collection {collection}"))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, raw)
            .with_context(|| format!("failed to write slot {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to replace slot {}", path.display()))?;
        Ok(())
    }
}
