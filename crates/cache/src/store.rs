//! Key-value stores backing the result cache

use async_trait::async_trait;
use dashmap::DashMap;
use stamp_core::{Error, Result};
use stamp_utils::atomic_file::{read_optional, write_atomic};
use std::path::{Path, PathBuf};

/// Minimal string key-value store
///
/// `put` overwrites; `get` returns `None` for keys never written.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn put(&self, key: &str, value: String) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }
}

/// One file per key under a directory, written atomically
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the store, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::file_system(&dir, "create result store directory", e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
            && key != "."
            && key != "..";
        if !safe {
            return Err(Error::store(key, "key is not usable as a file name"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn put(&self, key: &str, value: String) -> Result<()> {
        let path = self.entry_path(key)?;
        tokio::task::spawn_blocking(move || write_atomic(&path, value.as_bytes()))
            .await
            .map_err(|e| Error::store(key, format!("write task failed: {e}")))?
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        let bytes = tokio::task::spawn_blocking(move || read_optional(&path))
            .await
            .map_err(|e| Error::store(key, format!("read task failed: {e}")))??;

        bytes
            .map(|bytes| {
                String::from_utf8(bytes)
                    .map_err(|_| Error::store(key, "stored value is not valid UTF-8"))
            })
            .transpose()
    }
}
