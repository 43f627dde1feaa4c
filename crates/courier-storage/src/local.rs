use crate::traits::{PutObjectOutput, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use courier_core::models::{TemporaryCredentials, UploadTarget};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Credentials are accepted and ignored; the bucket name becomes a directory
/// under the base path.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert bucket and key to a filesystem path inside the base directory
    fn key_to_path(&self, bucket: &str, storage_key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(bucket).join(storage_key.trim_start_matches('/'));

        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || storage_key.split('/').all(str::is_empty) {
            return Err(StorageError::InvalidKey(format!(
                "Storage key {} resolves outside storage directory",
                storage_key
            )));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_object(
        &self,
        _credentials: &TemporaryCredentials,
        target: &UploadTarget,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> StorageResult<PutObjectOutput> {
        let key = target.key();
        let path = self.key_to_path(&target.bucket, &key)?;
        let size = data.len() as u64;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(PutObjectOutput {
            key,
            e_tag: None,
            size_bytes: size,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> TemporaryCredentials {
        TemporaryCredentials::new("AKIA", "secret", "token")
    }

    #[tokio::test]
    async fn test_put_writes_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let target = UploadTarget::new("bucket", "docs/2024", "report.txt");

        let output = storage
            .put_object(&creds(), &target, Bytes::from_static(b"hello"), Some("text/plain"))
            .await
            .unwrap();

        assert_eq!(output.key, "docs/2024/report.txt");
        assert_eq!(output.size_bytes, 5);
        let written = std::fs::read(dir.path().join("bucket/docs/2024/report.txt")).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_put_replaces_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let target = UploadTarget::new("bucket", "p", "f.bin");

        storage
            .put_object(&creds(), &target, Bytes::from_static(b"first"), None)
            .await
            .unwrap();
        storage
            .put_object(&creds(), &target, Bytes::from_static(b"2nd"), None)
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("bucket/p/f.bin")).unwrap();
        assert_eq!(written, b"2nd");
    }

    #[tokio::test]
    async fn test_put_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let target = UploadTarget::new("bucket", "../../etc", "passwd");

        let err = storage
            .put_object(&creds(), &target, Bytes::from_static(b"x"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_empty_prefix_lands_at_bucket_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let target = UploadTarget::new("bucket", "", "top.txt");

        let output = storage
            .put_object(&creds(), &target, Bytes::from_static(b"t"), None)
            .await
            .unwrap();
        assert_eq!(output.key, "/top.txt");
        assert!(dir.path().join("bucket/top.txt").exists());
    }
}
