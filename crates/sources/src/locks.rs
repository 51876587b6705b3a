//! Per-checkout serialization, in process and across processes

use dashmap::DashMap;
use stamp_core::{Error, Result};
use stamp_utils::path_lock::PathLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per checkout path
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

/// Held while a checkout is being inspected or modified
#[derive(Debug)]
pub struct CheckoutGuard {
    _file: PathLock,
    _local: OwnedMutexGuard<()>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`, first among tasks of this
    /// process and then through `<path>.lock` among processes
    pub async fn lock(&self, path: &Path) -> Result<CheckoutGuard> {
        let mutex = self
            .locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let local = mutex.lock_owned().await;

        let target = path.to_path_buf();
        let file = tokio::task::spawn_blocking(move || PathLock::acquire(&target))
            .await
            .map_err(|e| {
                Error::file_system(
                    path,
                    "acquire checkout lock",
                    std::io::Error::other(e.to_string()),
                )
            })??;

        Ok(CheckoutGuard {
            _file: file,
            _local: local,
        })
    }
}
