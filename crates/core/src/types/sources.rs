//! Pinned remote source types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which kind of configuration pinned the remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A source declared at project level
    Project,
    /// A source declared by a single module
    Module,
}

impl SourceKind {
    /// Directory grouping checkouts of this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            SourceKind::Project => "project",
            SourceKind::Module => "module",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Lifecycle of a local checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceState {
    NotPresent,
    Present,
}

/// A remote repository locked to a branch or tag, plus its local checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSourceRef {
    pub name: String,
    pub kind: SourceKind,
    pub repository_url: String,
    pub ref_name: String,
    /// Checkout location, derived only from (name, url, ref)
    pub local_path: PathBuf,
    pub state: SourceState,
}

impl RemoteSourceRef {
    /// Canonical `<url>#<ref>` form
    pub fn reference(&self) -> String {
        format!("{}#{}", self.repository_url, self.ref_name)
    }

    pub fn is_present(&self) -> bool {
        self.state == SourceState::Present
    }
}
