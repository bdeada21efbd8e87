//! Catalog entities owning media slots and rating aggregates.
//!
//! These mirror the authoritative rows held by the (out-of-scope) relational
//! store; the pipeline reads and writes them through the repository seam by
//! identifier only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub icon_url: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            image_url: None,
            icon_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub image_url: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            image_url: None,
        }
    }
}

/// A seller's store. The rating is derived state: the rounded mean of its
/// rated products, recomputed after every review write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub rating: Decimal,
}

impl Store {
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            rating: Decimal::ZERO,
        }
    }
}

/// One image of a product gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub url: String,
}

impl ProductImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
        }
    }
}

/// A product. `rating` is `None` until the first review lands; unrated
/// products are excluded from the store mean and presented as 0 upward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub main_image_url: Option<String>,
    pub video_url: Option<String>,
    pub gallery: Vec<ProductImage>,
    pub rating: Option<Decimal>,
}

impl Product {
    pub fn new(store_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            name: name.into(),
            main_image_url: None,
            video_url: None,
            gallery: Vec::new(),
            rating: None,
        }
    }

    pub fn gallery_urls(&self) -> Vec<String> {
        self.gallery.iter().map(|image| image.url.clone()).collect()
    }
}

/// A review, possibly spanning every product of one delivered order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub author_id: Uuid,
    pub product_ids: Vec<Uuid>,
    pub rating: Decimal,
    pub comment: Option<String>,
    pub images: Vec<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(author_id: Uuid, product_ids: Vec<Uuid>, rating: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            product_ids,
            rating,
            comment: None,
            images: Vec::new(),
            video_url: None,
            created_at: Utc::now(),
        }
    }
}
