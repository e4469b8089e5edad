mod github;
mod local;

pub use github::GitHubStore;
pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Stale sha for {0}; the file changed since it was read")]
    Conflict(String),
    #[error("{0}")]
    Backend(String),
}

/// A file as read from the repository, with the blob sha needed to overwrite it.
#[derive(Debug, Clone)]
pub struct ContentFile {
    pub data: Bytes,
    pub sha: String,
}

impl ContentFile {
    /// Decode the file as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// Repository-backed file storage. Paths are repository-relative (`data/games.csv`).
///
/// Writes are commits: `sha` must be the blob sha of the file being replaced,
/// or `None` when creating a new file.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<ContentFile, ContentStoreError>;
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        message: &str,
        sha: Option<&str>,
    ) -> Result<String, ContentStoreError>;
}

/// Write a file, creating or replacing it. The current sha is looked up first;
/// lookup failures are treated as "file does not exist yet".
pub async fn put_file(
    store: &dyn ContentStore,
    path: &str,
    data: Bytes,
    message: &str,
) -> Result<String, ContentStoreError> {
    let sha = match store.get(path).await {
        Ok(current) => Some(current.sha),
        Err(ContentStoreError::NotFound(_)) => None,
        Err(e) => {
            tracing::debug!(path, error = %e, "Could not read current sha, writing as new file");
            None
        }
    };
    store.put(path, data, message, sha.as_deref()).await
}

/// Git blob id of `data` (SHA-1 over `blob <len>\0<data>`), as the GitHub API reports it.
pub fn git_blob_sha(data: &[u8]) -> String {
    let mut ctx = ring::digest::Context::new(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY);
    ctx.update(format!("blob {}\0", data.len()).as_bytes());
    ctx.update(data);
    ctx.finish()
        .as_ref()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_blob_sha_matches_git() {
        // `printf 'hello world\n' | git hash-object --stdin`
        assert_eq!(
            git_blob_sha(b"hello world\n"),
            "3b18e512dba79e4c8300dd08aeb37f8e728b8dad"
        );
        // empty blob
        assert_eq!(git_blob_sha(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }
}
