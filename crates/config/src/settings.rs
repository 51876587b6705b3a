//! The settings struct and its validation

use serde::{Deserialize, Serialize};
use stamp_core::constants::{
    DEFAULT_HASH_CONCURRENCY, DEFAULT_IGNORE_FILE_NAME, DEFAULT_INTERNAL_DIR_NAME,
    DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_NETWORK_TIMEOUT_SECS, SOURCES_DIR_NAME,
};
use stamp_core::{Error, Result};
use stamp_utils::xdg::XdgPaths;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Effective settings shared by the resolver, the synchronizer and the result cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory name holding stamp's own state; never part of a version
    pub internal_dir_name: String,
    /// Per-directory file with project-specific ignore rules
    pub ignore_file_name: String,
    /// Files hashed concurrently during one resolution
    pub hash_concurrency: usize,
    /// Timeout for clone, fetch and ls-remote
    pub network_timeout_secs: u64,
    /// Largest task output kept in the result cache
    pub max_output_bytes: usize,
    /// Where remote sources are checked out; defaults to `<project>/.stamp/sources`
    pub sources_dir: Option<PathBuf>,
    /// Where the file-backed result store lives; defaults to the XDG cache dir
    pub cache_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            internal_dir_name: DEFAULT_INTERNAL_DIR_NAME.to_string(),
            ignore_file_name: DEFAULT_IGNORE_FILE_NAME.to_string(),
            hash_concurrency: DEFAULT_HASH_CONCURRENCY,
            network_timeout_secs: DEFAULT_NETWORK_TIMEOUT_SECS,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            sources_dir: None,
            cache_dir: None,
        }
    }
}

impl Settings {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    /// Remote source directory for a project rooted at `project_root`
    pub fn sources_dir_for(&self, project_root: &Path) -> PathBuf {
        self.sources_dir.clone().unwrap_or_else(|| {
            project_root
                .join(&self.internal_dir_name)
                .join(SOURCES_DIR_NAME)
        })
    }

    /// Directory of the file-backed result store
    pub fn result_cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| XdgPaths::cache_dir().join("results"))
    }

    /// Reject values that would stall or disable the engine
    pub fn validate(&self) -> Result<()> {
        if self.hash_concurrency == 0 {
            return Err(Error::configuration("hash_concurrency must be at least 1"));
        }
        if self.network_timeout_secs == 0 {
            return Err(Error::configuration(
                "network_timeout_secs must be at least 1",
            ));
        }
        if self.max_output_bytes == 0 {
            return Err(Error::configuration("max_output_bytes must be at least 1"));
        }
        for (field, value) in [
            ("internal_dir_name", &self.internal_dir_name),
            ("ignore_file_name", &self.ignore_file_name),
        ] {
            if value.is_empty() || value.contains('/') || value.contains('\\') {
                return Err(Error::configuration(format!(
                    "{field} must be a plain file name, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}
