//! Denormalized search record and its partial-update patch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-optimized copy of a subset of product fields. Eventually consistent
/// with the authoritative product row; never the source of truth. Created by a
/// separate indexing path; the pipeline only reconciles existing records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndexRecord {
    pub product_id: Uuid,
    pub name: String,
    pub main_image_url: Option<String>,
    pub gallery_urls: Vec<String>,
    pub video_url: Option<String>,
    pub rating: Option<Decimal>,
}

impl SearchIndexRecord {
    pub fn new(product_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            main_image_url: None,
            gallery_urls: Vec::new(),
            video_url: None,
            rating: None,
        }
    }
}

/// Partial update for a search record. Outer `None` leaves a field untouched;
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchDocPatch {
    pub main_image_url: Option<Option<String>>,
    pub gallery_urls: Option<Vec<String>>,
    pub video_url: Option<Option<String>>,
    pub rating: Option<Option<Decimal>>,
}

impl SearchDocPatch {
    pub fn main_image(url: Option<String>) -> Self {
        Self {
            main_image_url: Some(url),
            ..Self::default()
        }
    }

    pub fn gallery(urls: Vec<String>) -> Self {
        Self {
            gallery_urls: Some(urls),
            ..Self::default()
        }
    }

    pub fn video(url: Option<String>) -> Self {
        Self {
            video_url: Some(url),
            ..Self::default()
        }
    }

    pub fn rating(rating: Option<Decimal>) -> Self {
        Self {
            rating: Some(rating),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.main_image_url.is_none()
            && self.gallery_urls.is_none()
            && self.video_url.is_none()
            && self.rating.is_none()
    }

    /// Overwrite only the supplied fields.
    pub fn apply_to(&self, record: &mut SearchIndexRecord) {
        if let Some(main_image_url) = &self.main_image_url {
            record.main_image_url = main_image_url.clone();
        }
        if let Some(gallery_urls) = &self.gallery_urls {
            record.gallery_urls = gallery_urls.clone();
        }
        if let Some(video_url) = &self.video_url {
            record.video_url = video_url.clone();
        }
        if let Some(rating) = &self.rating {
            record.rating = *rating;
        }
    }
}
