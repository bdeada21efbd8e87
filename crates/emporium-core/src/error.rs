//! Error types module
//!
//! This module provides the core error types used throughout the Emporium
//! pipeline. All errors are unified under the [`AppError`] enum.
//!
//! Synchronous errors (validation, authorization, missing targets) propagate to
//! the caller of the orchestrator. Asynchronous errors (upload/deletion failures
//! inside a worker) never reach the original caller, whose request has already
//! returned; they are observable only through the tracing output.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like best-effort cleanup misses
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No media present: {0}")]
    FileNull(String),

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Queue closed: {0}")]
    QueueClosed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, log_level).
/// `recoverable` means a retry of the same call could succeed.
fn app_error_static_metadata(err: &AppError) -> (&'static str, bool, LogLevel) {
    match err {
        AppError::InvalidFile(_) => ("INVALID_FILE", false, LogLevel::Debug),
        AppError::InvalidInput(_) => ("INVALID_INPUT", false, LogLevel::Debug),
        AppError::Unauthorized(_) => ("UNAUTHORIZED", false, LogLevel::Debug),
        AppError::NotFound(_) => ("NOT_FOUND", false, LogLevel::Debug),
        AppError::FileNull(_) => ("FILE_NULL", false, LogLevel::Debug),
        AppError::PayloadTooLarge { .. } => ("PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::UploadFailed(_) => ("UPLOAD_FAILED", true, LogLevel::Error),
        AppError::DeleteFailed(_) => ("DELETE_FAILED", true, LogLevel::Warn),
        AppError::QueueClosed(_) => ("QUEUE_CLOSED", false, LogLevel::Error),
        AppError::Storage(_) => ("STORAGE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => ("INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Machine-readable error code (e.g. "UPLOAD_FAILED")
    pub fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    /// Whether retrying the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_file() {
        let err = AppError::InvalidFile("unsupported content type".to_string());
        assert_eq!(err.error_code(), "INVALID_FILE");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_upload_failed() {
        let err = AppError::UploadFailed("store timed out".to_string());
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_file_null() {
        let err = AppError::FileNull("product has no main image".to_string());
        assert_eq!(err.error_code(), "FILE_NULL");
        assert!(!err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_payload_too_large_message() {
        let err = AppError::PayloadTooLarge {
            size: 20_000_000,
            limit: 10_000_000,
        };
        assert!(err.to_string().contains("20000000"));
        assert!(err.to_string().contains("10000000"));
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
    }
}
