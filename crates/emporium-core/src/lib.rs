//! Emporium Core Library
//!
//! This crate provides the domain models, error types, configuration, and file
//! validation shared by every Emporium component: the media job types carried by
//! the queue, the catalog entities that own media slots, and the search index
//! record kept eventually consistent with them.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{MediaLimits, PipelineConfig, StorageConfig};
pub use error::{AppError, LogLevel};
pub use models::{
    Brand, Category, DeletionJob, MediaJob, MediaKind, MediaPayload, MediaReceipt, MediaTask,
    Product, ProductImage, RawFile, Review, SearchDocPatch, SearchIndexRecord, Store, UploadState,
    UploadedBlob, User,
};
