use bytes::Bytes;
use pnp_finder::content::{self, git_blob_sha, ContentStore, ContentStoreError, LocalStore};

#[tokio::test]
async fn test_local_store_put_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let data = Bytes::from("hello world");
    let sha = store
        .put("data/test.csv", data.clone(), "add", None)
        .await
        .unwrap();

    let retrieved = store.get("data/test.csv").await.unwrap();
    assert_eq!(retrieved.data, data);
    assert_eq!(retrieved.sha, sha);
    assert_eq!(sha, git_blob_sha(b"hello world"));
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let result = store.get("data/missing.csv").await;
    assert!(matches!(result.unwrap_err(), ContentStoreError::NotFound(_)));
}

#[tokio::test]
async fn test_local_store_overwrite_requires_current_sha() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let first = store
        .put("key.txt", Bytes::from("first"), "one", None)
        .await
        .unwrap();

    // Missing sha on an existing file
    let result = store.put("key.txt", Bytes::from("x"), "two", None).await;
    assert!(matches!(result.unwrap_err(), ContentStoreError::Conflict(_)));

    let second = store
        .put("key.txt", Bytes::from("second"), "two", Some(&first))
        .await
        .unwrap();

    // `first` is stale now
    let result = store
        .put("key.txt", Bytes::from("third"), "three", Some(&first))
        .await;
    assert!(matches!(result.unwrap_err(), ContentStoreError::Conflict(_)));

    let current = store.get("key.txt").await.unwrap();
    assert_eq!(current.data, Bytes::from("second"));
    assert_eq!(current.sha, second);
}

#[tokio::test]
async fn test_local_store_rejects_escaping_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("repo")).unwrap();

    for path in ["../outside.txt", "data/../../x", "/etc/passwd", ""] {
        let result = store.get(path).await;
        assert!(
            matches!(result.unwrap_err(), ContentStoreError::InvalidPath(_)),
            "{path:?}"
        );
    }
    let result = store
        .put("../outside.txt", Bytes::from("x"), "nope", None)
        .await;
    assert!(matches!(result.unwrap_err(), ContentStoreError::InvalidPath(_)));
    assert!(!dir.path().join("outside.txt").exists());
}

#[tokio::test]
async fn test_put_file_creates_then_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    content::put_file(&store, "uploads/games/a.png", Bytes::from("v1"), "add")
        .await
        .unwrap();
    let sha = content::put_file(&store, "uploads/games/a.png", Bytes::from("v2"), "replace")
        .await
        .unwrap();

    let current = store.get("uploads/games/a.png").await.unwrap();
    assert_eq!(current.data, Bytes::from("v2"));
    assert_eq!(current.sha, sha);
    assert!(dir.path().join("uploads/games/a.png").is_file());
}
