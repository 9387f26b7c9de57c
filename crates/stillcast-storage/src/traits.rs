//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The composition pipeline only moves whole files: inputs are fetched into
/// scratch space and the encoded output is stored back. Backends are built
/// once at startup and shared as `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the blob stored under `storage_key` into the file at `dest`,
    /// creating or truncating it. Returns the number of bytes written.
    ///
    /// A missing blob is reported as [`StorageError::NotFound`].
    async fn download_to_file(&self, storage_key: &str, dest: &Path) -> StorageResult<u64>;

    /// Store the file at `src` under `storage_key`, replacing any existing blob.
    /// Returns the fully-qualified object location.
    async fn upload_from_file(
        &self,
        storage_key: &str,
        src: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Check if a blob exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Fully-qualified location of a key (e.g. `gs://bucket/key`)
    fn object_location(&self, storage_key: &str) -> String;

    /// Bucket (or root) this backend reads from and writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
