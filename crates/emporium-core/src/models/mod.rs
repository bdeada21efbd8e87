//! Domain models

pub mod catalog;
pub mod job;
pub mod media;
pub mod search;

pub use catalog::{Brand, Category, Product, ProductImage, Review, Store, User};
pub use job::{DeletionJob, MediaJob, MediaPayload, MediaTask};
pub use media::{MediaClass, MediaKind, MediaReceipt, RawFile, UploadState, UploadedBlob};
pub use search::{SearchDocPatch, SearchIndexRecord};
