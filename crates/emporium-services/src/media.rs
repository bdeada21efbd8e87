//! Upload orchestration.
//!
//! The request-facing entry point of the media pipeline. Every operation runs
//! the same synchronous sequence (validate files, authorize the caller, read
//! the owning entity), then publishes work and returns a placeholder receipt
//! immediately. The caller never blocks on blob-store latency.
//!
//! When the target already holds media, a deletion job for the old
//! location(s) is published strictly before the new upload job. Both share
//! the target id, so per-key queue ordering guarantees a worker never races
//! the reclamation against the still-in-flight upload.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use emporium_core::config::MediaLimits;
use emporium_core::error::AppError;
use emporium_core::models::{
    DeletionJob, MediaJob, MediaKind, MediaReceipt, Product, RawFile, Review,
};
use emporium_core::validation::validate_files;
use emporium_db::{
    BrandRepository, CategoryRepository, ProductRepository, ReviewRepository, UserRepository,
};
use emporium_worker::MediaJobQueue;

use crate::access::{Actor, Authorizer};

pub struct UploadOrchestrator {
    queue: MediaJobQueue,
    authorizer: Arc<dyn Authorizer>,
    categories: Arc<dyn CategoryRepository>,
    brands: Arc<dyn BrandRepository>,
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    reviews: Arc<dyn ReviewRepository>,
    limits: MediaLimits,
}

impl UploadOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        queue: MediaJobQueue,
        authorizer: Arc<dyn Authorizer>,
        categories: Arc<dyn CategoryRepository>,
        brands: Arc<dyn BrandRepository>,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        reviews: Arc<dyn ReviewRepository>,
        limits: MediaLimits,
    ) -> Self {
        Self {
            queue,
            authorizer,
            categories,
            brands,
            users,
            products,
            reviews,
            limits,
        }
    }

    /// Publish the replacement pair for a target: reclamation of the old
    /// locations (when any) strictly before the new upload.
    async fn enqueue_replacement(
        &self,
        target_id: Uuid,
        kind: MediaKind,
        old_locations: Vec<String>,
        files: Vec<RawFile>,
    ) -> Result<(), AppError> {
        if !old_locations.is_empty() {
            self.queue
                .publish_delete(DeletionJob::new(target_id, kind, old_locations))
                .await?;
        }

        let job = if kind.is_gallery() {
            MediaJob::many(target_id, kind, files.into_iter().map(|f| f.bytes).collect())
        } else {
            let file = files.into_iter().next().ok_or_else(|| {
                AppError::Internal("validated submission lost its file".to_string())
            })?;
            MediaJob::single(target_id, kind, file.bytes)
        };

        self.queue.publish_upload(job).await
    }

    async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.products
            .get(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {} not found", product_id)))
    }

    async fn get_review(&self, review_id: Uuid) -> Result<Review, AppError> {
        self.reviews
            .get(review_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("review {} not found", review_id)))
    }

    // ---- category ----------------------------------------------------------

    pub async fn upload_category_image(
        &self,
        actor: &Actor,
        category_id: Uuid,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::CategoryImage;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;
        self.authorizer.require_admin(actor).await?;

        let category = self
            .categories
            .get(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {} not found", category_id)))?;

        let old = category.image_url.into_iter().collect();
        self.enqueue_replacement(category_id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(category_id, kind))
    }

    pub async fn upload_category_icon(
        &self,
        actor: &Actor,
        category_id: Uuid,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::CategoryIcon;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;
        self.authorizer.require_admin(actor).await?;

        let category = self
            .categories
            .get(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {} not found", category_id)))?;

        let old = category.icon_url.into_iter().collect();
        self.enqueue_replacement(category_id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(category_id, kind))
    }

    pub async fn delete_category_image(
        &self,
        actor: &Actor,
        category_id: Uuid,
    ) -> Result<(), AppError> {
        self.authorizer.require_admin(actor).await?;

        let category = self
            .categories
            .get(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {} not found", category_id)))?;

        let url = category.image_url.ok_or_else(|| {
            AppError::FileNull(format!("category {} has no image", category_id))
        })?;

        self.queue
            .publish_delete(DeletionJob::new(category_id, MediaKind::CategoryImage, vec![url]))
            .await?;
        self.categories.set_image_url(category_id, None).await
    }

    pub async fn delete_category_icon(
        &self,
        actor: &Actor,
        category_id: Uuid,
    ) -> Result<(), AppError> {
        self.authorizer.require_admin(actor).await?;

        let category = self
            .categories
            .get(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {} not found", category_id)))?;

        let url = category
            .icon_url
            .ok_or_else(|| AppError::FileNull(format!("category {} has no icon", category_id)))?;

        self.queue
            .publish_delete(DeletionJob::new(category_id, MediaKind::CategoryIcon, vec![url]))
            .await?;
        self.categories.set_icon_url(category_id, None).await
    }

    // ---- user --------------------------------------------------------------

    pub async fn upload_user_image(
        &self,
        actor: &Actor,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::UserImage;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;

        let user = self
            .users
            .get(actor.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", actor.user_id)))?;

        let old = user.image_url.into_iter().collect();
        self.enqueue_replacement(user.id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(user.id, kind))
    }

    pub async fn delete_user_image(&self, actor: &Actor) -> Result<(), AppError> {
        let user = self
            .users
            .get(actor.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", actor.user_id)))?;

        let url = user
            .image_url
            .ok_or_else(|| AppError::FileNull(format!("user {} has no image", user.id)))?;

        self.queue
            .publish_delete(DeletionJob::new(user.id, MediaKind::UserImage, vec![url]))
            .await?;
        self.users.set_image_url(user.id, None).await
    }

    // ---- brand -------------------------------------------------------------

    pub async fn upload_brand_logo(
        &self,
        actor: &Actor,
        brand_id: Uuid,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::BrandLogo;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;
        self.authorizer.require_admin(actor).await?;

        let brand = self
            .brands
            .get(brand_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("brand {} not found", brand_id)))?;

        let old = brand.logo_url.into_iter().collect();
        self.enqueue_replacement(brand_id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(brand_id, kind))
    }

    pub async fn delete_brand_logo(&self, actor: &Actor, brand_id: Uuid) -> Result<(), AppError> {
        self.authorizer.require_admin(actor).await?;

        let brand = self
            .brands
            .get(brand_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("brand {} not found", brand_id)))?;

        let url = brand
            .logo_url
            .ok_or_else(|| AppError::FileNull(format!("brand {} has no logo", brand_id)))?;

        self.queue
            .publish_delete(DeletionJob::new(brand_id, MediaKind::BrandLogo, vec![url]))
            .await?;
        self.brands.set_logo_url(brand_id, None).await
    }

    // ---- product -----------------------------------------------------------

    pub async fn upload_product_main_image(
        &self,
        actor: &Actor,
        product_id: Uuid,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::ProductMainImage;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;

        let product = self.get_product(product_id).await?;
        self.authorizer
            .require_product_owner(actor, &product)
            .await?;

        let old = product.main_image_url.into_iter().collect();
        self.enqueue_replacement(product_id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(product_id, kind))
    }

    pub async fn delete_product_main_image(
        &self,
        actor: &Actor,
        product_id: Uuid,
    ) -> Result<(), AppError> {
        let product = self.get_product(product_id).await?;
        self.authorizer
            .require_product_owner(actor, &product)
            .await?;

        let url = product.main_image_url.ok_or_else(|| {
            AppError::FileNull(format!("product {} has no main image", product_id))
        })?;

        self.queue
            .publish_delete(DeletionJob::new(
                product_id,
                MediaKind::ProductMainImage,
                vec![url],
            ))
            .await?;
        self.products.set_main_image_url(product_id, None).await
    }

    /// Upload a product gallery, replacing the current one. Returns one
    /// placeholder receipt per submitted image.
    pub async fn upload_product_gallery(
        &self,
        actor: &Actor,
        product_id: Uuid,
        files: Vec<RawFile>,
    ) -> Result<Vec<MediaReceipt>, AppError> {
        let kind = MediaKind::ProductGalleryImages;
        validate_files(kind, &files, &self.limits)?;

        let product = self.get_product(product_id).await?;
        self.authorizer
            .require_product_owner(actor, &product)
            .await?;

        let receipts = files
            .iter()
            .map(|_| MediaReceipt::processing(product_id, kind))
            .collect();

        self.enqueue_replacement(product_id, kind, product.gallery_urls(), files)
            .await?;
        Ok(receipts)
    }

    /// Remove selected gallery images. The id list must be non-empty, free of
    /// duplicates, and every id must name an image of this product's gallery.
    pub async fn delete_product_gallery_images(
        &self,
        actor: &Actor,
        product_id: Uuid,
        image_ids: Vec<Uuid>,
    ) -> Result<(), AppError> {
        let product = self.get_product(product_id).await?;
        self.authorizer
            .require_product_owner(actor, &product)
            .await?;

        if image_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "gallery image id list must not be empty".to_string(),
            ));
        }

        let unique: HashSet<Uuid> = image_ids.iter().copied().collect();
        if unique.len() < image_ids.len() {
            return Err(AppError::InvalidInput(
                "duplicate gallery image ids".to_string(),
            ));
        }

        let mut urls = Vec::with_capacity(image_ids.len());
        for id in &image_ids {
            let image = product
                .gallery
                .iter()
                .find(|image| image.id == *id)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "gallery image {} not found on product {}",
                        id, product_id
                    ))
                })?;
            urls.push(image.url.clone());
        }

        self.queue
            .publish_delete(DeletionJob::new(
                product_id,
                MediaKind::ProductGalleryImages,
                urls,
            ))
            .await?;
        self.products
            .remove_gallery_images(product_id, &image_ids)
            .await
    }

    pub async fn upload_product_video(
        &self,
        actor: &Actor,
        product_id: Uuid,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::ProductVideo;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;

        let product = self.get_product(product_id).await?;
        self.authorizer
            .require_product_owner(actor, &product)
            .await?;

        let old = product.video_url.into_iter().collect();
        self.enqueue_replacement(product_id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(product_id, kind))
    }

    pub async fn delete_product_video(
        &self,
        actor: &Actor,
        product_id: Uuid,
    ) -> Result<(), AppError> {
        let product = self.get_product(product_id).await?;
        self.authorizer
            .require_product_owner(actor, &product)
            .await?;

        let url = product
            .video_url
            .ok_or_else(|| AppError::FileNull(format!("product {} has no video", product_id)))?;

        self.queue
            .publish_delete(DeletionJob::new(product_id, MediaKind::ProductVideo, vec![url]))
            .await?;
        self.products.set_video_url(product_id, None).await
    }

    // ---- review ------------------------------------------------------------

    pub async fn upload_review_images(
        &self,
        actor: &Actor,
        review_id: Uuid,
        files: Vec<RawFile>,
    ) -> Result<Vec<MediaReceipt>, AppError> {
        let kind = MediaKind::ReviewImages;
        validate_files(kind, &files, &self.limits)?;

        let review = self.get_review(review_id).await?;
        self.authorizer
            .require_review_author(actor, &review)
            .await?;

        let receipts = files
            .iter()
            .map(|_| MediaReceipt::processing(review_id, kind))
            .collect();

        self.enqueue_replacement(review_id, kind, review.images, files)
            .await?;
        Ok(receipts)
    }

    pub async fn upload_review_video(
        &self,
        actor: &Actor,
        review_id: Uuid,
        file: RawFile,
    ) -> Result<MediaReceipt, AppError> {
        let kind = MediaKind::ReviewVideo;
        validate_files(kind, std::slice::from_ref(&file), &self.limits)?;

        let review = self.get_review(review_id).await?;
        self.authorizer
            .require_review_author(actor, &review)
            .await?;

        let old = review.video_url.into_iter().collect();
        self.enqueue_replacement(review_id, kind, old, vec![file])
            .await?;
        Ok(MediaReceipt::processing(review_id, kind))
    }
}
