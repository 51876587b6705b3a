//! Computes [`TreeVersion`]s for (root, filter) pairs

use crate::filter::GlobFilter;
use crate::hashing::ContentHasher;
use crate::scanner::{Candidate, WorkingTreeScanner};
use futures::{StreamExt, TryStreamExt};
use stamp_config::Settings;
use stamp_core::{Error, FileEntry, Result, TreeVersion};
use stamp_vcs::{GitBackend, VcsBackend};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Resolves deterministic tree versions.
///
/// Index hashes are trusted for files the backend does not report as
/// modified; only untracked and modified files are read and hashed here.
#[derive(Clone)]
pub struct VersionResolver {
    scanner: WorkingTreeScanner,
    hasher: ContentHasher,
    concurrency: usize,
}

impl VersionResolver {
    pub fn new(backend: Arc<dyn VcsBackend>, settings: &Settings) -> Self {
        Self {
            scanner: WorkingTreeScanner::new(backend, settings),
            hasher: ContentHasher::new(),
            concurrency: settings.hash_concurrency.max(1),
        }
    }

    /// Resolver backed by the system `git`
    pub fn git(settings: &Settings) -> Self {
        let backend = GitBackend::new().network_timeout(settings.network_timeout());
        Self::new(Arc::new(backend), settings)
    }

    pub fn scanner(&self) -> &WorkingTreeScanner {
        &self.scanner
    }

    /// Version of the files below `root` matching `include` (all files when `None`)
    pub async fn get_version(&self, root: &Path, include: Option<&[String]>) -> Result<TreeVersion> {
        let filter = GlobFilter::new(include, &[])?;
        self.get_version_with_filter(root, &filter).await
    }

    /// Version of the files below `root` accepted by `filter`
    #[tracing::instrument(level = "debug", skip_all, fields(root = %root.display()))]
    pub async fn get_version_with_filter(&self, root: &Path, filter: &GlobFilter) -> Result<TreeVersion> {
        let started = Instant::now();
        let root = canonical(root).await?;

        let Some(top_level) = self.scanner.top_level(&root).await? else {
            tracing::debug!("root is not inside a repository, version is empty");
            return TreeVersion::from_entries(&root, Vec::new());
        };
        let top_level = canonical(&top_level).await?;

        let (candidates, ignored, modified) = tokio::try_join!(
            self.scanner.list_candidates(&root, filter),
            self.scanner.list_ignored(&root),
            self.scanner.list_modified_in(&root, &top_level),
        )?;

        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !ignored.contains(&candidate.path))
            .collect();

        let entries = self.hash_candidates(filtered, &modified).await?;
        let version = TreeVersion::from_entries(&root, entries)?;

        stamp_utils::tracing::version_resolved(
            &root.to_string_lossy(),
            version.len(),
            &version.version_string(),
            started.elapsed().as_millis() as u64,
        );
        Ok(version)
    }

    async fn hash_candidates(
        &self,
        candidates: Vec<Candidate>,
        modified: &HashSet<PathBuf>,
    ) -> Result<Vec<FileEntry>> {
        let hasher = &self.hasher;

        let entries: Vec<Option<FileEntry>> = futures::stream::iter(candidates)
            .map(move |candidate| async move {
                match candidate.hash {
                    Some(hash) if !modified.contains(&candidate.path) => {
                        Ok(Some(FileEntry::new(candidate.path, hash)))
                    }
                    _ => match hasher.hash_file(&candidate.path).await {
                        Ok(hash) => Ok(Some(FileEntry::new(candidate.path, hash))),
                        Err(e) if e.is_not_found() => {
                            tracing::debug!(path = %candidate.path.display(), "file vanished, omitting");
                            Ok(None)
                        }
                        Err(e) => Err(e),
                    },
                }
            })
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        Ok(entries.into_iter().flatten().collect())
    }
}

async fn canonical(path: &Path) -> Result<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| match Error::file_system(path, "resolve root", e) {
            // A missing root is a caller error, not a vanished file to skip
            Error::FileNotFound { path } => Error::configuration(format!(
                "root directory does not exist: {}",
                path.display()
            )),
            other => other,
        })
}
