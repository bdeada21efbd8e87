//! Blob-store abstraction trait
//!
//! This module defines the MediaStore trait that all blob-store backends must
//! implement. The worker pool only ever talks to this trait.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use emporium_core::models::UploadedBlob;

/// Blob-store operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage location: {0}")]
    InvalidLocation(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for blob-store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Opaque blob-store capability.
///
/// `upload` stores the bytes under the given kind tag and returns a location
/// descriptor plus metadata. `delete` reclaims a blob by location and must be
/// idempotent: deleting a location that no longer exists is a success, because
/// at-least-once queue delivery means a deletion job can arrive twice.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a blob and return its location descriptor and metadata.
    async fn upload(&self, bytes: Bytes, kind_tag: &str) -> StorageResult<UploadedBlob>;

    /// Delete a blob by its location. A missing blob is not an error.
    async fn delete(&self, location: &str) -> StorageResult<()>;
}
