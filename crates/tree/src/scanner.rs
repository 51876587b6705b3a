//! Enumerates the files of a working tree through a [`VcsBackend`]

use crate::filter::GlobFilter;
use stamp_config::Settings;
use stamp_core::Result;
use stamp_vcs::{Scan, VcsBackend};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A file that may become part of a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path below the scanned root
    pub path: PathBuf,
    /// Index hash, absent for untracked files
    pub hash: Option<String>,
}

/// Lists candidate, ignored and modified files of a working tree.
///
/// A root outside any repository yields empty results rather than an error,
/// so a module living directly in a plain project directory still resolves.
#[derive(Clone)]
pub struct WorkingTreeScanner {
    backend: Arc<dyn VcsBackend>,
    internal_dir_name: String,
    ignore_file_name: String,
}

impl WorkingTreeScanner {
    pub fn new(backend: Arc<dyn VcsBackend>, settings: &Settings) -> Self {
        Self {
            backend,
            internal_dir_name: settings.internal_dir_name.clone(),
            ignore_file_name: settings.ignore_file_name.clone(),
        }
    }

    /// Repository top-level for `root`, or `None` outside a repository
    pub async fn top_level(&self, root: &Path) -> Result<Option<PathBuf>> {
        Ok(self.backend.top_level(root).await?.found())
    }

    /// Tracked and untracked files below `root` that pass `filter`
    pub async fn list_candidates(&self, root: &Path, filter: &GlobFilter) -> Result<Vec<Candidate>> {
        let listed = self
            .backend
            .list_files(root, &self.internal_dir_name)
            .await?
            .unwrap_or_default();

        Ok(listed
            .into_iter()
            .filter(|file| !self.is_internal(&file.path))
            .filter(|file| filter.matches(&file.path))
            .map(|file| Candidate {
                path: root.join(&file.path),
                hash: file.hash,
            })
            .collect())
    }

    /// Absolute paths below `root` matched by project-specific ignore files
    pub async fn list_ignored(&self, root: &Path) -> Result<HashSet<PathBuf>> {
        let ignored = self
            .backend
            .list_ignored(root, &self.ignore_file_name)
            .await?
            .unwrap_or_default();
        Ok(ignored.into_iter().map(|p| root.join(p)).collect())
    }

    /// Absolute paths below `root` with uncommitted changes
    pub async fn list_modified(&self, root: &Path) -> Result<HashSet<PathBuf>> {
        match self.top_level(root).await? {
            Some(top_level) => self.list_modified_in(root, &top_level).await,
            None => Ok(HashSet::new()),
        }
    }

    /// Like [`list_modified`](Self::list_modified) with an already resolved top-level
    pub async fn list_modified_in(&self, root: &Path, top_level: &Path) -> Result<HashSet<PathBuf>> {
        let modified = match self.backend.list_modified(root).await? {
            Scan::Found(paths) => paths,
            Scan::NoCommits | Scan::NotARepository => return Ok(HashSet::new()),
        };
        Ok(modified.into_iter().map(|p| top_level.join(p)).collect())
    }

    fn is_internal(&self, relative: &Path) -> bool {
        relative
            .components()
            .any(|c| matches!(c, Component::Normal(name) if name == self.internal_dir_name.as_str()))
    }
}
