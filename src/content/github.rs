use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ContentFile, ContentStore, ContentStoreError};
use crate::config::{CommitAuthor, GitHubConfig};

/// GitHub repository contents API backend. Every write is a commit on `branch`.
pub struct GitHubStore {
    api_url: String,
    owner: String,
    repo: String,
    token: String,
    branch: String,
    author: CommitAuthor,
    client: Client,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    size: u64,
    /// `base64`, or `none` for files over 1 MB whose content is left out
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: String,
}

impl ContentsResponse {
    fn is_inline(&self) -> bool {
        let base64 = self.encoding.as_deref().map_or(true, |e| e == "base64");
        base64 && !(self.content.is_empty() && self.size > 0)
    }
}

#[derive(Deserialize)]
struct CommitResponse {
    content: CommitContent,
}

#[derive(Deserialize)]
struct CommitContent {
    sha: String,
}

#[derive(Serialize)]
struct Person<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    committer: Person<'a>,
    author: Person<'a>,
}

impl GitHubStore {
    pub fn new(config: &GitHubConfig) -> Result<Self, anyhow::Error> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder.build()?;

        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| anyhow::anyhow!("{name} is required for the GitHub backend"))
        };

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: required(&config.owner, "GITHUB_OWNER")?,
            repo: required(&config.repo, "GITHUB_REPO")?,
            token: required(&config.token, "GITHUB_TOKEN")?,
            branch: config.branch.clone(),
            author: config.author.clone(),
            client,
        })
    }

    fn repo_url<'s>(
        &self,
        segments: impl IntoIterator<Item = &'s str>,
    ) -> Result<Url, ContentStoreError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ContentStoreError::Backend(format!("Invalid GitHub API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ContentStoreError::Backend("GitHub API URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, ContentStoreError> {
        self.repo_url(
            std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty())),
        )
    }

    /// Fetch a blob's raw bytes by sha. Works up to 100 MB, past the contents
    /// API's inline limit, and always matches the sha the caller will write against.
    async fn get_blob(&self, path: &str, sha: &str) -> Result<Bytes, ContentStoreError> {
        let resp = self
            .client
            .get(self.repo_url(["git", "blobs", sha])?)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }

        let data = resp
            .bytes()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;
        tracing::debug!(path, sha, size = data.len(), "Fetched large file from blob API");
        Ok(data)
    }

    async fn failure(resp: reqwest::Response) -> ContentStoreError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        ContentStoreError::Backend(format!("GitHub {}: {body}", status.as_u16()))
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn get(&self, path: &str) -> Result<ContentFile, ContentStoreError> {
        let mut url = self.contents_url(path)?;
        url.query_pairs_mut().append_pair("ref", &self.branch);

        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentStoreError::NotFound(path.to_string()));
        }

        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }

        let body: ContentsResponse = resp
            .json()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;

        let data = if body.is_inline() {
            // The API wraps base64 content at 60 columns
            let encoded: String = body
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map(Bytes::from)
                .map_err(|e| ContentStoreError::Backend(format!("Invalid base64 content: {e}")))?
        } else {
            self.get_blob(path, &body.sha).await?
        };

        // Never return fewer bytes than the file holds
        if data.len() as u64 != body.size && body.size > 0 {
            return Err(ContentStoreError::Backend(format!(
                "Incomplete content for {path}: got {} of {} bytes",
                data.len(),
                body.size
            )));
        }

        Ok(ContentFile {
            data,
            sha: body.sha,
        })
    }

    async fn put(
        &self,
        path: &str,
        data: Bytes,
        message: &str,
        sha: Option<&str>,
    ) -> Result<String, ContentStoreError> {
        let request = PutRequest {
            message,
            content: base64::engine::general_purpose::STANDARD.encode(&data),
            branch: &self.branch,
            sha,
            committer: Person {
                name: &self.author.name,
                email: &self.author.email,
            },
            author: Person {
                name: &self.author.name,
                email: &self.author.email,
            },
        };

        let resp = self
            .client
            .put(self.contents_url(path)?)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(ContentStoreError::Conflict(path.to_string()));
        }

        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }

        let body: CommitResponse = resp
            .json()
            .await
            .map_err(|e| ContentStoreError::Backend(e.to_string()))?;

        tracing::debug!(path, sha = %body.content.sha, "Committed file to GitHub");
        Ok(body.content.sha)
    }
}
