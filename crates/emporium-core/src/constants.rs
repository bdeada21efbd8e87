//! Shared constants

/// Sentinel location returned in placeholder receipts while an upload is still
/// being processed by the worker pool.
pub const PROCESSING_PLACEHOLDER: &str = "processing://pending";

/// Maximum number of images accepted in a single product gallery upload.
pub const MAX_GALLERY_IMAGES: usize = 10;

/// Maximum number of images accepted on a single review.
pub const MAX_REVIEW_IMAGES: usize = 5;
