use sha1::{Digest, Sha1};
use stamp_core::{Error, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Attempts before giving up on a file that keeps changing size while read
const MAX_HASH_ATTEMPTS: usize = 3;

/// Hashes files in the VCS blob format: `sha1("blob <len>\0" + content)`.
///
/// Because the format matches what the index records, a hash computed here
/// for an unmodified tracked file equals the one the backend reports.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    buffer_size: usize,
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Read buffer size used while streaming file content
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    /// Blob hash of in-memory content
    pub fn hash_bytes(content: &[u8]) -> String {
        let mut hasher = blob_hasher(content.len() as u64);
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    /// Blob hash of a file, streamed in fixed-size chunks.
    ///
    /// Symbolic links hash their target path, as the VCS stores them.
    /// Fails with [`Error::FileNotFound`] when the file vanished.
    pub async fn hash_file(&self, path: &Path) -> Result<String> {
        let metadata = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| Error::file_system(path, "stat file for hashing", e))?;

        if metadata.file_type().is_symlink() {
            let target = tokio::fs::read_link(path)
                .await
                .map_err(|e| Error::file_system(path, "read symlink for hashing", e))?;
            return Ok(Self::hash_bytes(&link_bytes(&target)));
        }

        for attempt in 1..=MAX_HASH_ATTEMPTS {
            if let Some(hash) = self.hash_stream(path).await? {
                return Ok(hash);
            }
            tracing::debug!(path = %path.display(), attempt, "file changed while hashing, retrying");
        }

        Err(Error::file_system(
            path,
            "hash file",
            std::io::Error::other("file kept changing while it was being hashed"),
        ))
    }

    /// `None` when the byte count read disagrees with the size the header promised
    async fn hash_stream(&self, path: &Path) -> Result<Option<String>> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::file_system(path, "open file for hashing", e))?;
        let expected = file
            .metadata()
            .await
            .map_err(|e| Error::file_system(path, "stat file for hashing", e))?
            .len();

        let mut hasher = blob_hasher(expected);
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total: u64 = 0;

        loop {
            let bytes_read = file
                .read(&mut buffer)
                .await
                .map_err(|e| Error::file_system(path, "read file chunk for hashing", e))?;
            if bytes_read == 0 {
                break;
            }
            total += bytes_read as u64;
            if total > expected {
                return Ok(None);
            }
            hasher.update(&buffer[..bytes_read]);
        }

        if total != expected {
            return Ok(None);
        }
        Ok(Some(hex::encode(hasher.finalize())))
    }
}

fn blob_hasher(len: u64) -> Sha1 {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {len}\0").as_bytes());
    hasher
}

#[cfg(unix)]
fn link_bytes(target: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    target.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn link_bytes(target: &Path) -> Vec<u8> {
    target.to_string_lossy().replace('\\', "/").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // `printf 'hello\n' | git hash-object --stdin`
    const HELLO_BLOB: &str = "ce013625030ba8dba906f756967f9e9ca394464a";
    // `git hash-object /dev/null`
    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn test_hash_bytes_matches_blob_format() {
        assert_eq!(ContentHasher::hash_bytes(b"hello\n"), HELLO_BLOB);
        assert_eq!(ContentHasher::hash_bytes(b""), EMPTY_BLOB);
    }

    #[tokio::test]
    async fn test_hash_file_streams_in_small_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello.txt");
        fs::write(&path, "hello\n").unwrap();

        let hash = ContentHasher::with_buffer_size(2)
            .hash_file(&path)
            .await
            .unwrap();
        assert_eq!(hash, HELLO_BLOB);
    }

    #[tokio::test]
    async fn test_large_file_matches_in_memory_hash() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.bin");
        let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();

        let hash = ContentHasher::new().hash_file(&path).await.unwrap();
        assert_eq!(hash, ContentHasher::hash_bytes(&content));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = ContentHasher::new()
            .hash_file(&temp_dir.path().join("gone.txt"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_hashes_its_target_path() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("real.txt"), "content").unwrap();
        let link = temp_dir.path().join("link.txt");
        std::os::unix::fs::symlink("real.txt", &link).unwrap();

        let hash = ContentHasher::new().hash_file(&link).await.unwrap();
        assert_eq!(hash, ContentHasher::hash_bytes(b"real.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_still_hashes() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("dangling");
        std::os::unix::fs::symlink("nowhere", &link).unwrap();

        let hash = ContentHasher::new().hash_file(&link).await.unwrap();
        assert_eq!(hash, ContentHasher::hash_bytes(b"nowhere"));
    }
}
