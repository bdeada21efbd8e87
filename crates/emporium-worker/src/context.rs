//! Worker context: the collaborators a worker needs to resolve a job.
//!
//! The search-index seam is a trait here; the services crate implements it.
//! The worker only knows that a product's denormalized record can be asked to
//! catch up with the authoritative row.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::SearchDocPatch;
use emporium_db::{
    BrandRepository, CategoryRepository, ProductRepository, ReviewRepository, UserRepository,
};
use emporium_storage::MediaStore;

/// Reconciles the denormalized search record of a product.
///
/// Implementations must be non-fatal on an absent record: the triggering media
/// job already succeeded and must not be failed retroactively.
#[async_trait]
pub trait SearchSync: Send + Sync {
    async fn reconcile(&self, product_id: Uuid, patch: SearchDocPatch) -> Result<(), AppError>;
}

/// Everything a lane consumer needs, explicitly constructed and owned.
pub struct WorkerContext {
    pub media_store: Arc<dyn MediaStore>,
    pub categories: Arc<dyn CategoryRepository>,
    pub brands: Arc<dyn BrandRepository>,
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub search: Arc<dyn SearchSync>,
    /// A blob-store call not returning within this window counts as failed.
    pub store_timeout: Duration,
}
