use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Maximum accepted request body in bytes (submissions carry base64 images)
    pub max_body_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBackend {
    GitHub,
    Local,
}

#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub backend: ContentBackend,
    /// Repository checkout root for the local backend (holds `data/` and `uploads/`)
    pub local_path: String,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub branch: String,
    pub author: CommitAuthor,
    pub timeout_secs: u64,
}

/// Name and email recorded as both committer and author.
#[derive(Debug, Clone)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "PnPFinder Bot".to_string(),
            email: "bot@pnpfinder.com".to_string(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            owner: None,
            repo: None,
            token: None,
            branch: "main".to_string(),
            author: CommitAuthor::default(),
            timeout_secs: 40,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::Local,
            local_path: ".".to_string(),
            github: GitHubConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let max_body_size = std::env::var("MAX_BODY_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // 10MB

        let backend = match std::env::var("CONTENT_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "github" => ContentBackend::GitHub,
            _ => ContentBackend::Local,
        };

        let local_path = std::env::var("LOCAL_CONTENT_PATH").unwrap_or_else(|_| ".".to_string());

        let defaults = GitHubConfig::default();
        let github = GitHubConfig {
            api_url: std::env::var("GITHUB_API_URL").unwrap_or(defaults.api_url),
            owner: non_empty_var("GITHUB_OWNER"),
            repo: non_empty_var("GITHUB_REPO"),
            token: non_empty_var("GITHUB_TOKEN"),
            branch: non_empty_var("GITHUB_BRANCH").unwrap_or(defaults.branch),
            author: CommitAuthor {
                name: non_empty_var("GIT_AUTHOR_NAME").unwrap_or(defaults.author.name),
                email: non_empty_var("GIT_AUTHOR_EMAIL").unwrap_or(defaults.author.email),
            },
            timeout_secs: std::env::var("GITHUB_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        };

        let config = Config {
            server: ServerConfig {
                bind_address,
                max_body_size,
            },
            content: ContentConfig {
                backend,
                local_path,
                github,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.content.backend == ContentBackend::GitHub {
            let github = &self.content.github;
            for (name, value) in [
                ("GITHUB_OWNER", &github.owner),
                ("GITHUB_REPO", &github.repo),
                ("GITHUB_TOKEN", &github.token),
            ] {
                if value.is_none() {
                    return Err(ConfigError::ValidationError(format!(
                        "{name} is required when CONTENT_BACKEND=github"
                    )));
                }
            }
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.content.github.timeout_secs == 0 {
            tracing::warn!("GITHUB_TIMEOUT_SECS is 0; content API requests will not time out");
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
