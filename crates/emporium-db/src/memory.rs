//! Bundled in-memory backend.
//!
//! One repository struct per aggregate, each a `Clone` handle over a shared
//! map. Used by the test suites and by embedders that bring their own
//! relational store only for the CRUD layer.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::{
    Brand, Category, Product, ProductImage, Review, SearchDocPatch, SearchIndexRecord, Store, User,
};

use crate::traits::{
    BrandRepository, CategoryRepository, ProductRepository, ReviewRepository,
    SearchIndexRepository, StoreRepository, UserRepository,
};

fn not_found(entity: &str, id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {} not found", entity, id))
}

#[derive(Clone, Default)]
pub struct InMemoryCategories {
    rows: Arc<RwLock<HashMap<Uuid, Category>>>,
}

impl InMemoryCategories {
    pub async fn insert(&self, category: Category) {
        self.rows.write().await.insert(category.id, category);
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn get(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn set_image_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let category = rows.get_mut(&id).ok_or_else(|| not_found("category", id))?;
        category.image_url = url;
        Ok(())
    }

    async fn set_icon_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let category = rows.get_mut(&id).ok_or_else(|| not_found("category", id))?;
        category.icon_url = url;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBrands {
    rows: Arc<RwLock<HashMap<Uuid, Brand>>>,
}

impl InMemoryBrands {
    pub async fn insert(&self, brand: Brand) {
        self.rows.write().await.insert(brand.id, brand);
    }
}

#[async_trait]
impl BrandRepository for InMemoryBrands {
    async fn get(&self, id: Uuid) -> Result<Option<Brand>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn set_logo_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let brand = rows.get_mut(&id).ok_or_else(|| not_found("brand", id))?;
        brand.logo_url = url;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUsers {
    rows: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUsers {
    pub async fn insert(&self, user: User) {
        self.rows.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn set_image_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let user = rows.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        user.image_url = url;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryProducts {
    rows: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProducts {
    pub async fn insert(&self, product: Product) {
        self.rows.write().await.insert(product.id, product);
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_by_store(&self, store_id: Uuid) -> Result<Vec<Product>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|product| product.store_id == store_id)
            .cloned()
            .collect())
    }

    async fn set_main_image_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let product = rows.get_mut(&id).ok_or_else(|| not_found("product", id))?;
        product.main_image_url = url;
        Ok(())
    }

    async fn set_video_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let product = rows.get_mut(&id).ok_or_else(|| not_found("product", id))?;
        product.video_url = url;
        Ok(())
    }

    async fn replace_gallery(
        &self,
        id: Uuid,
        urls: Vec<String>,
    ) -> Result<Vec<ProductImage>, AppError> {
        let mut rows = self.rows.write().await;
        let product = rows.get_mut(&id).ok_or_else(|| not_found("product", id))?;
        product.gallery = urls.into_iter().map(ProductImage::new).collect();
        Ok(product.gallery.clone())
    }

    async fn remove_gallery_images(&self, id: Uuid, image_ids: &[Uuid]) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let product = rows.get_mut(&id).ok_or_else(|| not_found("product", id))?;
        product.gallery.retain(|image| !image_ids.contains(&image.id));
        Ok(())
    }

    async fn set_rating(&self, id: Uuid, rating: Option<Decimal>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let product = rows.get_mut(&id).ok_or_else(|| not_found("product", id))?;
        product.rating = rating;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStores {
    rows: Arc<RwLock<HashMap<Uuid, Store>>>,
}

impl InMemoryStores {
    pub async fn insert(&self, store: Store) {
        self.rows.write().await.insert(store.id, store);
    }
}

#[async_trait]
impl StoreRepository for InMemoryStores {
    async fn get(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn set_rating(&self, id: Uuid, rating: Decimal) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let store = rows.get_mut(&id).ok_or_else(|| not_found("store", id))?;
        store.rating = rating;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryReviews {
    rows: Arc<RwLock<Vec<Review>>>,
}

#[async_trait]
impl ReviewRepository for InMemoryReviews {
    async fn get(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|review| review.id == id)
            .cloned())
    }

    async fn insert(&self, review: Review) -> Result<(), AppError> {
        self.rows.write().await.push(review);
        Ok(())
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|review| review.product_ids.contains(&product_id))
            .cloned()
            .collect())
    }

    async fn exists_for_author_and_product(
        &self,
        author_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self.rows.read().await.iter().any(|review| {
            review.author_id == author_id && review.product_ids.contains(&product_id)
        }))
    }

    async fn set_images(&self, id: Uuid, urls: Vec<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let review = rows
            .iter_mut()
            .find(|review| review.id == id)
            .ok_or_else(|| not_found("review", id))?;
        review.images = urls;
        Ok(())
    }

    async fn set_video_url(&self, id: Uuid, url: Option<String>) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let review = rows
            .iter_mut()
            .find(|review| review.id == id)
            .ok_or_else(|| not_found("review", id))?;
        review.video_url = url;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySearchIndex {
    rows: Arc<RwLock<HashMap<Uuid, SearchIndexRecord>>>,
}

impl InMemorySearchIndex {
    /// Seed a record, standing in for the separate indexing path that owns
    /// record creation.
    pub async fn insert(&self, record: SearchIndexRecord) {
        self.rows.write().await.insert(record.product_id, record);
    }
}

#[async_trait]
impl SearchIndexRepository for InMemorySearchIndex {
    async fn find_by_product(
        &self,
        product_id: Uuid,
    ) -> Result<Option<SearchIndexRecord>, AppError> {
        Ok(self.rows.read().await.get(&product_id).cloned())
    }

    async fn apply_patch(
        &self,
        product_id: Uuid,
        patch: &SearchDocPatch,
    ) -> Result<bool, AppError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&product_id) {
            Some(record) => {
                patch.apply_to(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
