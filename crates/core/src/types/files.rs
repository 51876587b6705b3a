//! File fingerprint types

use crate::constants::{VERSION_HASH_LENGTH, VERSION_PREFIX};
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// One file of a versioned tree and its blob hash
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute, resolved path
    pub path: PathBuf,
    /// Hex-encoded blob hash
    pub hash: String,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hash: hash.into(),
        }
    }
}

/// Deterministic fingerprint of a filtered file set.
///
/// Entries are always sorted by path and the aggregate hash is derived from
/// the sorted `(relative path, hash)` pairs, so two resolutions of the same
/// tree agree no matter in which order the files were hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeVersion {
    files: Vec<FileEntry>,
    aggregate_hash: String,
}

impl TreeVersion {
    /// Build a version from unordered entries found below `root`
    pub fn from_entries(root: &Path, mut files: Vec<FileEntry>) -> Result<Self> {
        files.sort();
        files.dedup_by(|a, b| a.path == b.path);

        let pairs: Vec<(String, &str)> = files
            .iter()
            .map(|entry| (relative_key(root, &entry.path), entry.hash.as_str()))
            .collect();
        let serialized = serde_json::to_string(&pairs)?;

        let mut hasher = Sha256::new();
        hasher.update(serialized.as_bytes());
        let aggregate_hash = hex::encode(hasher.finalize());

        Ok(Self {
            files,
            aggregate_hash,
        })
    }

    /// Sorted file entries
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn aggregate_hash(&self) -> &str {
        &self.aggregate_hash
    }

    /// Short version string used as the cache key component, e.g. `v-3f2a9c01de`
    pub fn version_string(&self) -> String {
        let short = self
            .aggregate_hash
            .get(..VERSION_HASH_LENGTH)
            .unwrap_or(&self.aggregate_hash);
        format!("{VERSION_PREFIX}{short}")
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up the hash recorded for a path
    pub fn hash_of(&self, path: &Path) -> Option<&str> {
        self.files
            .binary_search_by(|entry| entry.path.as_path().cmp(path))
            .ok()
            .map(|idx| self.files[idx].hash.as_str())
    }
}

impl fmt::Display for TreeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version_string())
    }
}

/// Root-relative, `/`-separated key so the aggregate does not depend on where the tree lives
fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(path: &str, hash: &str) -> FileEntry {
        FileEntry::new(path, hash)
    }

    #[test]
    fn test_entries_are_sorted() {
        let version = TreeVersion::from_entries(
            Path::new("/repo"),
            vec![entry("/repo/b.txt", "bb"), entry("/repo/a.txt", "aa")],
        )
        .unwrap();

        let paths: Vec<_> = version.files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/repo/a.txt"), PathBuf::from("/repo/b.txt")]
        );
        assert_eq!(version.hash_of(Path::new("/repo/b.txt")), Some("bb"));
    }

    #[test]
    fn test_version_string_of_short_deserialized_hash() {
        let version: TreeVersion =
            serde_json::from_str(r#"{"files":[],"aggregate_hash":"abc"}"#).unwrap();
        assert_eq!(version.version_string(), "v-abc");
    }

    #[test]
    fn test_empty_version_is_valid() {
        let version = TreeVersion::from_entries(Path::new("/repo"), vec![]).unwrap();
        assert!(version.is_empty());
        assert_eq!(version.aggregate_hash().len(), 64);
        assert!(version.version_string().starts_with("v-"));
        assert_eq!(version.version_string().len(), 12);
    }

    #[test]
    fn test_aggregate_is_location_independent() {
        let a = TreeVersion::from_entries(
            Path::new("/one"),
            vec![entry("/one/src/main.go", "abc")],
        )
        .unwrap();
        let b = TreeVersion::from_entries(
            Path::new("/two"),
            vec![entry("/two/src/main.go", "abc")],
        )
        .unwrap();
        assert_eq!(a.aggregate_hash(), b.aggregate_hash());
    }

    #[test]
    fn test_content_change_changes_version() {
        let a = TreeVersion::from_entries(Path::new("/r"), vec![entry("/r/f", "1")]).unwrap();
        let b = TreeVersion::from_entries(Path::new("/r"), vec![entry("/r/f", "2")]).unwrap();
        assert_ne!(a.version_string(), b.version_string());
    }

    proptest! {
        #[test]
        fn prop_order_independent(names in proptest::collection::btree_set("[a-z]{1,8}", 0..12)
            .prop_map(|s| s.into_iter().collect::<Vec<_>>())) {
            let entries: Vec<FileEntry> = names
                .iter()
                .map(|n| entry(&format!("/r/{n}"), n))
                .collect();
            let forward = TreeVersion::from_entries(Path::new("/r"), entries.clone()).unwrap();
            let reversed: Vec<FileEntry> = entries.into_iter().rev().collect();
            let backward = TreeVersion::from_entries(Path::new("/r"), reversed).unwrap();
            prop_assert_eq!(forward, backward);
        }
    }
}
