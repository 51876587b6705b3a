//! Cross-process advisory lock for a path shared by several stamp processes

use fs2::FileExt;
use stamp_core::{Error, Result};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive lock on `<path>.lock`, released on drop.
///
/// The lock file itself is left in place; the OS drops the lock when the
/// holding process exits, so a crashed holder never blocks later runs.
#[derive(Debug)]
pub struct PathLock {
    file: File,
}

impl PathLock {
    /// Lock file used for `path`
    pub fn lock_path_for(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("root"));
        name.push(".lock");
        path.with_file_name(name)
    }

    /// Block until the lock for `path` is held
    pub fn acquire(path: &Path) -> Result<Self> {
        let (file, lock_path) = open_lock_file(path)?;
        file.lock_exclusive()
            .map_err(|e| Error::file_system(&lock_path, "acquire lock", e))?;
        Ok(Self { file })
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

fn open_lock_file(path: &Path) -> Result<(File, PathBuf)> {
    let lock_path = PathLock::lock_path_for(path);
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::file_system(parent, "create lock directory", e))?;
    }
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::file_system(&lock_path, "open lock file", e))?;
    Ok((file, lock_path))
}
