//! Storage abstraction trait

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use courier_core::models::{TemporaryCredentials, UploadTarget};
use courier_core::UploadError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Message without the variant prefix, as reported by the backend
    pub fn message(&self) -> String {
        match self {
            StorageError::UploadFailed(msg)
            | StorageError::InvalidKey(msg)
            | StorageError::ConfigError(msg) => msg.clone(),
            StorageError::IoError(e) => e.to_string(),
        }
    }
}

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        UploadError::Storage(err.message())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What the backend reports for a completed put
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOutput {
    pub key: String,
    pub e_tag: Option<String>,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// A put is authorized by the temporary credentials handed in with each call;
/// backends keep no long-lived credentials of their own.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` to `target.key()` in a single put.
    async fn put_object(
        &self,
        credentials: &TemporaryCredentials,
        target: &UploadTarget,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StorageResult<PutObjectOutput>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
