//! Bringing pinned remote sources into existence and up to date

use crate::locks::KeyedLocks;
use crate::paths::checkout_path;
use crate::reference::SourceReference;
use stamp_config::Settings;
use stamp_core::{Error, RemoteSourceRef, Result, SourceKind, SourceState};
use stamp_utils::tracing::{source_event, source_failed};
use stamp_vcs::{GitBackend, VcsBackend};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What an `ensure` or `update` call did to the checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The checkout did not exist and was cloned
    Cloned,
    /// The checkout already existed; nothing was fetched
    AlreadyPresent,
    /// Local and remote commits matched
    AlreadyUpToDate,
    /// The checkout was moved to the remote commit
    Updated { from: Option<String>, to: String },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Cloned => write!(f, "cloned"),
            SyncOutcome::AlreadyPresent => write!(f, "already present"),
            SyncOutcome::AlreadyUpToDate => write!(f, "already up to date"),
            SyncOutcome::Updated { to, .. } => write!(f, "updated to {to}"),
        }
    }
}

/// Keeps shallow checkouts of pinned remote sources below one directory
///
/// Calls for the same checkout are serialized; calls for different
/// checkouts run independently.
#[derive(Clone)]
pub struct RemoteSourceSync {
    backend: Arc<dyn VcsBackend>,
    sources_dir: PathBuf,
    locks: Arc<KeyedLocks>,
}

impl fmt::Debug for RemoteSourceSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSourceSync")
            .field("sources_dir", &self.sources_dir)
            .finish_non_exhaustive()
    }
}

impl RemoteSourceSync {
    pub fn new(backend: Arc<dyn VcsBackend>, sources_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            sources_dir: sources_dir.into(),
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Synchronizer using the `git` binary and the project's sources directory
    pub fn git(settings: &Settings, project_root: &Path) -> Self {
        let backend = GitBackend::new().network_timeout(settings.network_timeout());
        Self::new(Arc::new(backend), settings.sources_dir_for(project_root))
    }

    pub fn sources_dir(&self) -> &Path {
        &self.sources_dir
    }

    /// Describe a source and where it lives, without touching the network
    pub fn resolve(&self, name: &str, kind: SourceKind, reference: &str) -> Result<RemoteSourceRef> {
        let parsed = SourceReference::parse(reference)?;
        let local_path = checkout_path(&self.sources_dir, kind, name, &parsed)?;
        let state = if is_checkout(&local_path) {
            SourceState::Present
        } else {
            SourceState::NotPresent
        };
        Ok(RemoteSourceRef {
            name: name.to_string(),
            kind,
            repository_url: parsed.url,
            ref_name: parsed.ref_name,
            local_path,
            state,
        })
    }

    /// Clone the source if it has no checkout yet
    pub async fn ensure(
        &self,
        name: &str,
        kind: SourceKind,
        reference: &str,
    ) -> Result<(RemoteSourceRef, SyncOutcome)> {
        let source = self.resolve(name, kind, reference)?;
        let _guard = self.locks.lock(&source.local_path).await?;
        self.ensure_locked(source).await
    }

    /// Ensure the checkout exists, then move it to the remote's current
    /// commit for the pinned ref if that differs from the local one
    pub async fn update(
        &self,
        name: &str,
        kind: SourceKind,
        reference: &str,
    ) -> Result<(RemoteSourceRef, SyncOutcome)> {
        let source = self.resolve(name, kind, reference)?;
        let _guard = self.locks.lock(&source.local_path).await?;
        let (source, ensured) = self.ensure_locked(source).await?;

        let outcome = self
            .refresh(&source)
            .await
            .inspect_err(|e| source_failed(&source.name, &source.repository_url, e))?;

        let outcome = match (ensured, outcome) {
            (SyncOutcome::Cloned, SyncOutcome::AlreadyUpToDate) => SyncOutcome::Cloned,
            (_, outcome) => outcome,
        };
        Ok((source, outcome))
    }

    /// Commit the checkout currently holds for its pinned ref
    pub async fn local_commit(&self, source: &RemoteSourceRef) -> Result<Option<String>> {
        if !is_checkout(&source.local_path) {
            return Ok(None);
        }
        self.backend
            .local_commit(&source.local_path, &source.ref_name)
            .await
    }

    async fn ensure_locked(
        &self,
        mut source: RemoteSourceRef,
    ) -> Result<(RemoteSourceRef, SyncOutcome)> {
        if self.has_commit(&source).await {
            source.state = SourceState::Present;
            return Ok((source, SyncOutcome::AlreadyPresent));
        }

        source_event(&source.name, &source.repository_url, "fetching");
        if let Err(e) = self.clone_into(&source).await {
            source_failed(&source.name, &source.repository_url, &e);
            return Err(e);
        }
        source.state = SourceState::Present;
        Ok((source, SyncOutcome::Cloned))
    }

    /// A checkout only counts once it holds a commit for its ref; a bare
    /// `.git` left by a killed clone does not
    async fn has_commit(&self, source: &RemoteSourceRef) -> bool {
        if !is_checkout(&source.local_path) {
            return false;
        }
        match self.local_commit(source).await {
            Ok(Some(_)) => true,
            Ok(None) => {
                tracing::debug!(path = %source.local_path.display(), "checkout has no commit, recloning");
                false
            }
            Err(e) => {
                tracing::debug!(path = %source.local_path.display(), error = %e, "unreadable checkout, recloning");
                false
            }
        }
    }

    /// Clone into a temporary sibling and move it into place only once the
    /// clone finished, so `local_path` never holds a partial checkout
    async fn clone_into(&self, source: &RemoteSourceRef) -> Result<()> {
        let path = &source.local_path;
        let parent = path
            .parent()
            .ok_or_else(|| Error::configuration(format!("invalid checkout path {}", path.display())))?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::file_system(parent, "create sources directory", e))?;

        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Removed on drop, including when the caller cancels mid-clone
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{dir_name}.partial-"))
            .tempdir_in(parent)
            .map_err(|e| Error::file_system(parent, "create clone staging directory", e))?;
        let staged = staging.path().join("checkout");

        self.backend
            .clone_ref(&source.repository_url, &source.ref_name, &staged)
            .await
            .map_err(|e| {
                Error::fetch_with_source(
                    &source.repository_url,
                    format!("clone of '{}' failed", source.ref_name),
                    e,
                )
            })?;

        // Leftovers of an incomplete checkout
        if path.exists() {
            remove_dir(path).await?;
        }
        tokio::fs::rename(&staged, path)
            .await
            .map_err(|e| Error::file_system(path, "move clone into place", e))?;
        Ok(())
    }

    async fn refresh(&self, source: &RemoteSourceRef) -> Result<SyncOutcome> {
        let url = &source.repository_url;
        let ref_name = &source.ref_name;
        let checkout = &source.local_path;
        let fetch_error = |step: &str, e: Error| {
            Error::fetch_with_source(url, format!("{step} for '{ref_name}' failed"), e)
        };

        self.backend
            .remote_update(checkout)
            .await
            .map_err(|e| fetch_error("remote update", e))?;
        let remote = self
            .backend
            .remote_commit(checkout, url, ref_name)
            .await
            .map_err(|e| fetch_error("ls-remote", e))?
            .ok_or_else(|| Error::fetch(url, format!("ref '{ref_name}' not found on remote")))?;
        let local = self
            .backend
            .local_commit(checkout, ref_name)
            .await
            .map_err(|e| fetch_error("show-ref", e))?;

        if local.as_deref() == Some(remote.as_str()) {
            source_event(&source.name, url, "already up to date");
            return Ok(SyncOutcome::AlreadyUpToDate);
        }

        source_event(&source.name, url, "fetching");
        self.backend
            .fetch_ref(checkout, ref_name)
            .await
            .map_err(|e| fetch_error("fetch", e))?;
        self.backend
            .reset_hard(checkout, ref_name)
            .await
            .map_err(|e| fetch_error("reset", e))?;

        tracing::debug!(
            source = %source.name,
            from = local.as_deref().unwrap_or("none"),
            to = %remote,
            "Moved checkout"
        );
        source_event(&source.name, url, "updated");
        Ok(SyncOutcome::Updated {
            from: local,
            to: remote,
        })
    }
}

/// Cheap offline check; `ensure` additionally requires a commit
fn is_checkout(path: &Path) -> bool {
    path.join(".git").exists()
}

async fn remove_dir(path: &Path) -> Result<()> {
    tokio::fs::remove_dir_all(path)
        .await
        .map_err(|e| Error::file_system(path, "remove incomplete checkout", e))
}
