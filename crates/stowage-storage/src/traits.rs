//! Remote store abstraction
//!
//! This module defines the `RemoteStore` trait every remote provider adapter implements.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use stowage_core::{AppError, RemoteBackend, ResourceKind, TargetFolder, UploadResult};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload timed out after {0} ms")]
    Timeout(u64),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether another attempt against the same provider may succeed.
    ///
    /// Only a rejected key is final: network, I/O and provider errors are all retried.
    pub fn is_transient(&self) -> bool {
        !matches!(self, StorageError::InvalidKey(_))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Config(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Remote object-storage provider
///
/// One call is one attempt: implementations open a single upload stream, write the
/// whole buffer and wait for completion within `timeout`. They never retry and never
/// touch local disk; retry and fallback are the orchestrator's job.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload `buffer` under `folder` and return the provider's result record.
    ///
    /// The returned record always has `is_fallback == false`.
    async fn upload(
        &self,
        buffer: Bytes,
        filename: &str,
        folder: TargetFolder,
        kind: ResourceKind,
        timeout: Duration,
    ) -> StorageResult<UploadResult>;

    /// Get the remote backend type
    fn backend_type(&self) -> RemoteBackend;
}
