use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};

use super::{git_blob_sha, ContentFile, ContentStore, ContentStoreError};

/// Local filesystem content store for development and testing.
///
/// Mirrors the GitHub contents API semantics: overwriting a file requires the
/// sha of its current contents.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn file_path(&self, path: &str) -> Result<PathBuf, ContentStoreError> {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(ContentStoreError::InvalidPath(path.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    async fn get(&self, path: &str) -> Result<ContentFile, ContentStoreError> {
        let file_path = self.file_path(path)?;
        if !file_path.is_file() {
            return Err(ContentStoreError::NotFound(path.to_string()));
        }
        let data = tokio::fs::read(&file_path).await?;
        let sha = git_blob_sha(&data);
        Ok(ContentFile {
            data: Bytes::from(data),
            sha,
        })
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        message: &str,
        sha: Option<&str>,
    ) -> Result<String, ContentStoreError> {
        let file_path = self.file_path(path)?;

        if file_path.is_file() {
            let current = git_blob_sha(&tokio::fs::read(&file_path).await?);
            if sha != Some(current.as_str()) {
                return Err(ContentStoreError::Conflict(path.to_string()));
            }
        }

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, &data).await?;

        tracing::debug!(path, message, "Wrote file to local content store");
        Ok(git_blob_sha(&data))
    }
}
