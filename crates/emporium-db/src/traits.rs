//! Repository traits: the by-identifier reads and writes the pipeline needs.
//!
//! Every media slot is owned by exactly one entity and mutated through its
//! repository; per-key queue ordering makes each slot effectively
//! single-writer. Rating fields are written by the review path without a lock
//! (last-writer-wins).

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::{
    Brand, Category, Product, ProductImage, Review, SearchDocPatch, SearchIndexRecord, Store, User,
};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Category>, AppError>;
    async fn set_image_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
    async fn set_icon_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait BrandRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Brand>, AppError>;
    async fn set_logo_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn set_image_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError>;
    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Product>, AppError>;
    async fn set_main_image_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
    async fn set_video_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
    /// Replace the whole gallery with freshly minted rows for the given urls.
    async fn replace_gallery(
        &self,
        id: Uuid,
        urls: Vec<String>,
    ) -> Result<Vec<ProductImage>, AppError>;
    /// Remove the given gallery rows; ids not present are ignored.
    async fn remove_gallery_images(&self, id: Uuid, image_ids: &[Uuid]) -> Result<(), AppError>;
    async fn set_rating(&self, id: Uuid, rating: Option<Decimal>) -> Result<(), AppError>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Store>, AppError>;
    async fn set_rating(&self, id: Uuid, rating: Decimal) -> Result<(), AppError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Review>, AppError>;
    async fn insert(&self, review: Review) -> Result<(), AppError>;
    /// Every review referencing the product, in creation order.
    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, AppError>;
    async fn exists_for_author_and_product(
        &self,
        author_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError>;
    async fn set_images(&self, id: Uuid, urls: Vec<String>) -> Result<(), AppError>;
    async fn set_video_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait SearchIndexRepository: Send + Sync {
    async fn find_by_product(&self, product_id: Uuid)
        -> Result<Option<SearchIndexRecord>, AppError>;
    /// Apply a partial update. Returns `false` when no record exists for the
    /// product; the caller logs and moves on, it never creates the record.
    async fn apply_patch(
        &self,
        product_id: Uuid,
        patch: &SearchDocPatch,
    ) -> Result<bool, AppError>;
}
