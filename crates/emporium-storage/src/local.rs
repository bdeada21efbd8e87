use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::keys::{detect_format, generate_storage_key};
use crate::traits::{MediaStore, StorageError, StorageResult};
use emporium_core::models::UploadedBlob;

/// Local filesystem blob store
#[derive(Clone)]
pub struct LocalMediaStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    /// Create a new LocalMediaStore instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/emporium/media")
    /// * `base_url` - Base URL for serving blobs (e.g., "http://localhost:4000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalMediaStore {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that could
    /// escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidLocation(
                "storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Public location for a key
    fn location_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Map a location back to its storage key. Locations minted by another
    /// backend (different base url) are invalid here.
    fn location_to_key<'a>(&self, location: &'a str) -> StorageResult<&'a str> {
        location
            .strip_prefix(&self.base_url)
            .map(|rest| rest.trim_start_matches('/'))
            .ok_or_else(|| {
                StorageError::InvalidLocation(format!(
                    "location '{}' does not belong to this store",
                    location
                ))
            })
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, bytes: Bytes, kind_tag: &str) -> StorageResult<UploadedBlob> {
        let format = detect_format(&bytes);
        let key = generate_storage_key(kind_tag, format);
        let path = self.key_to_path(&key)?;
        let size = bytes.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("create {}: {}", path.display(), e)))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("write {}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("flush {}: {}", path.display(), e)))?;

        tracing::debug!(key = %key, size_bytes = size, "Stored blob on local filesystem");

        Ok(UploadedBlob {
            location: self.location_for(&key),
            format: format.to_string(),
            size_bytes: size,
            created_at: Utc::now(),
        })
    }

    async fn delete(&self, location: &str) -> StorageResult<()> {
        let key = self.location_to_key(location)?;
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Deleted blob from local filesystem");
                Ok(())
            }
            // Idempotent: the blob may already be gone after a redelivery.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
