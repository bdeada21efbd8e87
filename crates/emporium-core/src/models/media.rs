use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PROCESSING_PLACEHOLDER;

/// Media class enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Image,
    Video,
}

/// The media slots the pipeline manages. Each slot belongs to exactly one
/// owning entity and holds either a single location or a gallery of locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    CategoryImage,
    CategoryIcon,
    UserImage,
    BrandLogo,
    ProductMainImage,
    ProductGalleryImages,
    ProductVideo,
    ReviewImages,
    ReviewVideo,
}

impl MediaKind {
    /// Image or video, for validation and blob-store routing.
    pub fn media_class(&self) -> MediaClass {
        match self {
            MediaKind::ProductVideo | MediaKind::ReviewVideo => MediaClass::Video,
            _ => MediaClass::Image,
        }
    }

    /// Tag handed to the blob store so backends can group blobs per slot.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            MediaKind::CategoryImage => "category_image",
            MediaKind::CategoryIcon => "category_icon",
            MediaKind::UserImage => "user_image",
            MediaKind::BrandLogo => "brand_logo",
            MediaKind::ProductMainImage => "product_main_image",
            MediaKind::ProductGalleryImages => "product_gallery",
            MediaKind::ProductVideo => "product_video",
            MediaKind::ReviewImages => "review_images",
            MediaKind::ReviewVideo => "review_video",
        }
    }

    /// Whether this slot carries a set of locations rather than a single one.
    pub fn is_gallery(&self) -> bool {
        matches!(self, MediaKind::ProductGalleryImages | MediaKind::ReviewImages)
    }

    /// Whether this slot feeds the denormalized product search record.
    pub fn syncs_search_index(&self) -> bool {
        matches!(
            self,
            MediaKind::ProductMainImage | MediaKind::ProductGalleryImages | MediaKind::ProductVideo
        )
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind_tag())
    }
}

/// A request-side file: what the out-of-scope transport layer hands the
/// orchestrator after multipart decoding.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl RawFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Metadata returned by the blob store for a stored blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedBlob {
    pub location: String,
    pub format: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Processing state reported in placeholder receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Processing,
    Completed,
    Failed,
}

/// The synchronous reply to a media submission: accepted, processing.
///
/// The location is a sentinel until the worker pool resolves the job; callers
/// read the authoritative location from the owning entity afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReceipt {
    pub target_id: Uuid,
    pub kind: MediaKind,
    pub state: UploadState,
    pub location: String,
    pub submitted_at: DateTime<Utc>,
}

impl MediaReceipt {
    pub fn processing(target_id: Uuid, kind: MediaKind) -> Self {
        Self {
            target_id,
            kind,
            state: UploadState::Processing,
            location: PROCESSING_PLACEHOLDER.to_string(),
            submitted_at: Utc::now(),
        }
    }
}
