//! Kind-specific file validation.
//!
//! Runs synchronously in the orchestrator before anything reaches the queue:
//! a failed validation rejects the whole submission and nothing is enqueued.

use crate::config::MediaLimits;
use crate::constants::{MAX_GALLERY_IMAGES, MAX_REVIEW_IMAGES};
use crate::error::AppError;
use crate::models::{MediaClass, MediaKind, RawFile};

/// Validate a single image file against the configured limits.
pub fn validate_image(file: &RawFile, limits: &MediaLimits) -> Result<(), AppError> {
    if file.bytes.is_empty() {
        return Err(AppError::InvalidFile(format!(
            "file '{}' is empty",
            file.filename
        )));
    }

    let content_type = file.content_type.to_lowercase();
    if !limits.image_allowed_content_types.contains(&content_type) {
        return Err(AppError::InvalidFile(format!(
            "unsupported image content type '{}' for '{}'",
            file.content_type, file.filename
        )));
    }

    if file.bytes.len() > limits.max_image_size_bytes {
        return Err(AppError::PayloadTooLarge {
            size: file.bytes.len(),
            limit: limits.max_image_size_bytes,
        });
    }

    Ok(())
}

/// Validate a single video file against the configured limits.
pub fn validate_video(file: &RawFile, limits: &MediaLimits) -> Result<(), AppError> {
    if file.bytes.is_empty() {
        return Err(AppError::InvalidFile(format!(
            "file '{}' is empty",
            file.filename
        )));
    }

    let content_type = file.content_type.to_lowercase();
    if !limits.video_allowed_content_types.contains(&content_type) {
        return Err(AppError::InvalidFile(format!(
            "unsupported video content type '{}' for '{}'",
            file.content_type, file.filename
        )));
    }

    if file.bytes.len() > limits.max_video_size_bytes {
        return Err(AppError::PayloadTooLarge {
            size: file.bytes.len(),
            limit: limits.max_video_size_bytes,
        });
    }

    Ok(())
}

fn max_files_for(kind: MediaKind) -> usize {
    match kind {
        MediaKind::ProductGalleryImages => MAX_GALLERY_IMAGES,
        MediaKind::ReviewImages => MAX_REVIEW_IMAGES,
        _ => 1,
    }
}

/// Validate a submission for a media slot: file count first, then every file.
pub fn validate_files(kind: MediaKind, files: &[RawFile], limits: &MediaLimits) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::InvalidFile(format!(
            "no files supplied for {}",
            kind
        )));
    }

    let max_files = max_files_for(kind);
    if files.len() > max_files {
        return Err(AppError::InvalidFile(format!(
            "{} accepts at most {} file(s), got {}",
            kind,
            max_files,
            files.len()
        )));
    }

    for file in files {
        match kind.media_class() {
            MediaClass::Image => validate_image(file, limits)?,
            MediaClass::Video => validate_video(file, limits)?,
        }
    }

    Ok(())
}
