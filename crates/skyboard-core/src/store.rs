//! String key-value storage shared by the dashboard widgets.
//!
//! The weather widget keeps its unit and location here, the to-do list and
//! notes keep their whole collections as JSON values. A JSON object file in
//! the config directory backs the app; an in-memory map backs tests.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const STORE_FILE: &str = "preferences.json";

/// String key-value storage that survives restarts.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Store backed by a JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let json = fs::read_to_string(&path).context("Failed to read preferences file")?;
            match serde_json::from_str(&json) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable preferences at {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Open `preferences.json` inside `config_dir`.
    pub fn in_dir(config_dir: &Path) -> Result<Self> {
        Self::open(config_dir.join(STORE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }

        let json =
            serde_json::to_string_pretty(values).context("Failed to serialize preferences")?;
        fs::write(&self.path, json).context("Failed to write preferences file")
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    /// The in-memory value only changes once the file has been written.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock();

        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());
        self.write(&updated)?;
        *values = updated;

        tracing::debug!("Stored preference {} at {:?}", key, self.path);
        Ok(())
    }
}

/// Store that forgets everything when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
