//! The narrow interface resolution and synchronization use to reach a VCS

use async_trait::async_trait;
use stamp_core::Result;
use std::path::{Path, PathBuf};

/// Outcome of a repository query, with benign failures named instead of numbered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan<T> {
    Found(T),
    /// The queried path is not inside a repository
    NotARepository,
    /// The repository exists but has no commits yet
    NoCommits,
}

impl<T: Default> Scan<T> {
    /// The found value, or an empty one for the benign outcomes
    pub fn unwrap_or_default(self) -> T {
        match self {
            Scan::Found(value) => value,
            Scan::NotARepository | Scan::NoCommits => T::default(),
        }
    }
}

impl<T> Scan<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Scan::Found(value) => Some(value),
            Scan::NotARepository | Scan::NoCommits => None,
        }
    }
}

/// One candidate file as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFile {
    /// Relative to the listed directory
    pub path: PathBuf,
    /// Hash recorded in the index; `None` for untracked files
    pub hash: Option<String>,
}

/// Operations the engine needs from a version-control system.
///
/// Local queries take the directory to inspect; remote operations take the
/// checkout they act on. Implementations must report "not a repository" and
/// "no commits" through [`Scan`] rather than as errors; anything else that
/// goes wrong is an `Err`.
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Top-level directory of the repository containing `path`
    async fn top_level(&self, path: &Path) -> Result<Scan<PathBuf>>;

    /// Tracked and untracked files below `path`, skipping `exclude_dir`
    async fn list_files(&self, path: &Path, exclude_dir: &str) -> Result<Scan<Vec<ListedFile>>>;

    /// Files below `path` matched by rules in per-directory `ignore_file`s, relative to `path`
    async fn list_ignored(&self, path: &Path, ignore_file: &str) -> Result<Scan<Vec<PathBuf>>>;

    /// Files below `path` changed relative to HEAD, relative to the top-level directory
    async fn list_modified(&self, path: &Path) -> Result<Scan<Vec<PathBuf>>>;

    /// Shallow clone of a single branch or tag into `dest`
    async fn clone_ref(&self, url: &str, ref_name: &str, dest: &Path) -> Result<()>;

    /// Refresh remote-tracking metadata of a checkout
    async fn remote_update(&self, checkout: &Path) -> Result<()>;

    /// Commit the remote currently has for `ref_name`, if the ref exists there
    async fn remote_commit(&self, checkout: &Path, url: &str, ref_name: &str)
        -> Result<Option<String>>;

    /// Commit the checkout has for `ref_name`, if any
    async fn local_commit(&self, checkout: &Path, ref_name: &str) -> Result<Option<String>>;

    /// Shallow fetch of `ref_name` from origin
    async fn fetch_ref(&self, checkout: &Path, ref_name: &str) -> Result<()>;

    /// Hard reset of the checkout to `origin/<ref_name>`
    async fn reset_hard(&self, checkout: &Path, ref_name: &str) -> Result<()>;
}
