//! Emporium Storage Library
//!
//! This crate provides the blob-store abstraction the pipeline consumes and a
//! local filesystem implementation of it. The pipeline treats the store as an
//! opaque capability: store bytes under a kind tag, get a location descriptor
//! back, delete by location.
//!
//! # Storage key format
//!
//! Keys are slot-scoped: `media/{kind_tag}/{uuid}.{format}`. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so all backends stay consistent.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalMediaStore;
pub use traits::{MediaStore, StorageError, StorageResult};
