//! Courier Storage Library
//!
//! Object-put abstraction used by the federated upload flow, with an S3 backend
//! that signs each request with the caller's temporary credentials and a local
//! filesystem backend for development.
//!
//! # Key format
//!
//! Objects are written under `{prefix}/{filename}` exactly as the user entered the
//! prefix. The local backend rejects keys that would escape its base directory.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use courier_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{PutObjectOutput, Storage, StorageError, StorageResult};
