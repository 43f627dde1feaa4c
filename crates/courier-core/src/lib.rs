//! Courier Core Library
//!
//! This crate provides the configuration, error types, domain models and URL
//! construction shared by the Courier web server, services and CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod hosted_ui;
pub mod models;
pub mod stack;
pub mod storage_types;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{AppError, ErrorMetadata, LogLevel, UploadError};
pub use hosted_ui::HostedUi;
pub use storage_types::StorageBackend;
