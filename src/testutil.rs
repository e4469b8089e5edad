//! Shared test helpers for in-crate router tests.

use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, ContentConfig, ServerConfig};
use crate::content::LocalStore;
use crate::AppState;

/// Create a test AppState backed by a local content store rooted at `temp_dir`.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let root = temp_dir.path();

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            ..ServerConfig::default()
        },
        content: ContentConfig {
            local_path: root.to_string_lossy().to_string(),
            ..ContentConfig::default()
        },
    };

    let store = LocalStore::new(root).expect("Failed to create test content store");

    Arc::new(AppState {
        config,
        store: Arc::new(store),
    })
}

/// Write a repository file under the test root, creating parent directories.
pub fn write_file(temp_dir: &tempfile::TempDir, path: &str, contents: &str) {
    let full = temp_dir.path().join(Path::new(path));
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create test directory");
    }
    std::fs::write(full, contents).expect("Failed to write test file");
}
