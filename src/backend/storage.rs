//! Object storage for uploaded files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::errors::BackendError;

use super::BackendResult;

/// Length of the content hash prefix used in object paths.
const HASH_PREFIX_LEN: usize = 16;

/// An uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Bucket holding the object.
    pub bucket: String,

    /// Path inside the bucket.
    pub path: String,

    /// Publicly reachable URL.
    pub public_url: String,

    /// Size in bytes.
    pub size: usize,
}

/// Upload-then-public-URL object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` in `bucket` under a path derived from `name` and returns where it went.
    async fn upload(&self, bucket: &str, name: &str, bytes: &[u8]) -> BackendResult<StoredObject>;

    /// Public URL of an object path.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Builds a content-addressed object path: `<sha256 prefix>/<file name>`.
pub fn object_path(name: &str, bytes: &[u8]) -> BackendResult<String> {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| {
            BackendError::new(format!("invalid object name '{}'", name)).with_code("invalid_name")
        })?;

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hex::encode(hasher.finalize());

    Ok(format!("{}/{}", &digest[..HASH_PREFIX_LEN], file_name))
}

/// Object storage on the local filesystem.
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Creates a storage rooted at `root`, published under `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Filesystem location of an object.
    pub fn local_path(&self, bucket: &str, path: &str) -> PathBuf {
        self.root.join(bucket).join(path)
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, bucket: &str, name: &str, bytes: &[u8]) -> BackendResult<StoredObject> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == ".." {
            return Err(BackendError::new(format!("invalid bucket '{}'", bucket))
                .with_code("invalid_name"));
        }

        let path = object_path(name, bytes)?;
        let target = self.local_path(bucket, &path);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        tracing::info!(bucket, path = %path, size = bytes.len(), "Object uploaded");

        Ok(StoredObject {
            bucket: bucket.to_string(),
            public_url: self.public_url(bucket, &path),
            path,
            size: bytes.len(),
        })
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path_is_content_addressed() {
        let a = object_path("quy-trinh.pdf", b"v1").unwrap();
        let b = object_path("quy-trinh.pdf", b"v2").unwrap();
        let c = object_path("quy-trinh.pdf", b"v1").unwrap();

        assert_ne!(a, b);
        assert_eq!(a, c);
        assert!(a.ends_with("/quy-trinh.pdf"));
    }

    #[test]
    fn test_object_path_strips_directories() {
        let path = object_path("../../etc/passwd", b"x").unwrap();
        assert!(path.ends_with("/passwd"));
        assert!(!path.contains(".."));

        assert!(object_path("", b"x").is_err());
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "https://files.example.org/public/");

        let stored = storage
            .upload("documents", "so-tay-chat-luong.docx", b"noi dung")
            .await
            .unwrap();

        assert_eq!(stored.size, 8);
        assert_eq!(
            stored.public_url,
            format!("https://files.example.org/public/documents/{}", stored.path)
        );

        let on_disk = std::fs::read(storage.local_path("documents", &stored.path)).unwrap();
        assert_eq!(on_disk, b"noi dung");
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://x");

        assert!(storage.upload("../up", "a.txt", b"x").await.is_err());
        assert!(storage.upload("", "a.txt", b"x").await.is_err());
    }
}
