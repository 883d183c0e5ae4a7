//! Named collections of labelled saved states.
//!
//! Each collection is persisted as one JSON blob, `{"history": {label: state}}`, through a
//! [`Storage`] backend. Every change rewrites the whole blob; the last writer wins. The
//! in-memory entries only change once the backend has accepted the new blob.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Blob storage keyed by collection name.
pub trait Storage: Send + Sync {
    fn read(&self, name: &str) -> anyhow::Result<Option<String>>;
    fn write(&self, name: &str, blob: &str) -> anyhow::Result<()>;
}

/// In-process storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, name: &str) -> anyhow::Result<Option<String>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(blobs.get(name).cloned())
    }

    fn write(&self, name: &str, blob: &str) -> anyhow::Result<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        blobs.insert(name.to_string(), blob.to_string());
        Ok(())
    }
}

/// One `<name>.json` file per collection inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, name: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(name);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write(&self, name: &str, blob: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(name);
        fs::write(&path, blob).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[derive(Deserialize)]
struct HistoryBlob<S> {
    history: BTreeMap<String, S>,
}

#[derive(Serialize)]
struct HistoryBlobRef<'a, S> {
    history: &'a BTreeMap<String, S>,
}

/// Saved states of one calculator, by label.
pub struct HistoryStore<S> {
    name: String,
    storage: Arc<dyn Storage>,
    entries: BTreeMap<String, S>,
}

impl<S> HistoryStore<S>
where
    S: Serialize + DeserializeOwned + Clone,
{
    /// Opens the collection `name`. A missing or unreadable blob opens an empty history.
    pub fn open(name: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        let name = name.into();
        let entries = match storage.read(&name) {
            Ok(Some(blob)) => match serde_json::from_str::<HistoryBlob<S>>(&blob) {
                Ok(parsed) => parsed.history,
                Err(e) => {
                    warn!("Discarding unreadable history '{name}': {e}");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read history '{name}': {e:#}");
                BTreeMap::new()
            }
        };
        debug!("Opened history '{}' with {} entries", name, entries.len());

        Self {
            name,
            storage,
            entries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Saves `state` under `label`, replacing any previous state with that label.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written. The history is left unchanged.
    pub fn save(&mut self, label: impl Into<String>, state: S) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(label.into(), state);
        self.persist(&entries)?;
        self.entries = entries;
        Ok(())
    }

    pub fn load(&self, label: &str) -> Option<S> {
        self.entries.get(label).cloned()
    }

    /// Deletes every saved state of the collection. On a write error nothing is deleted.
    pub fn reset(&mut self) -> Result<()> {
        self.persist(&BTreeMap::new())?;
        self.entries.clear();
        Ok(())
    }

    /// Saved labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self, entries: &BTreeMap<String, S>) -> Result<()> {
        let blob = serde_json::to_string(&HistoryBlobRef { history: entries })?;
        self.storage.write(&self.name, &blob)?;
        Ok(())
    }
}
