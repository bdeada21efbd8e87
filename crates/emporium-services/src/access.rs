//! Authorization seam.
//!
//! The orchestrator confirms the caller may touch the owning entity before
//! anything reaches the queue. The checks live behind a trait so the
//! (out-of-scope) auth layer can substitute its own policy.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::{Product, Review};
use emporium_db::StoreRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Seller,
    Customer,
}

/// The caller identity the request layer resolved before invoking us.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Category and brand media are admin-managed.
    async fn require_admin(&self, actor: &Actor) -> Result<(), AppError>;

    /// Product media may only be changed by the seller owning the store.
    async fn require_product_owner(
        &self,
        actor: &Actor,
        product: &Product,
    ) -> Result<(), AppError>;

    /// Review media may only be changed by the review's author.
    async fn require_review_author(&self, actor: &Actor, review: &Review)
        -> Result<(), AppError>;
}

/// Ownership-based policy backed by the store repository.
pub struct CatalogAuthorizer {
    stores: Arc<dyn StoreRepository>,
}

impl CatalogAuthorizer {
    pub fn new(stores: Arc<dyn StoreRepository>) -> Self {
        Self { stores }
    }
}

#[async_trait]
impl Authorizer for CatalogAuthorizer {
    async fn require_admin(&self, actor: &Actor) -> Result<(), AppError> {
        if actor.role != Role::Admin {
            return Err(AppError::Unauthorized(
                "admin role required".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_product_owner(
        &self,
        actor: &Actor,
        product: &Product,
    ) -> Result<(), AppError> {
        if actor.role != Role::Seller {
            return Err(AppError::Unauthorized("seller role required".to_string()));
        }

        let store = self
            .stores
            .get(product.store_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("store {} not found", product.store_id)))?;

        if store.owner_id != actor.user_id {
            return Err(AppError::Unauthorized(format!(
                "caller does not own the store selling product {}",
                product.id
            )));
        }

        Ok(())
    }

    async fn require_review_author(
        &self,
        actor: &Actor,
        review: &Review,
    ) -> Result<(), AppError> {
        if review.author_id != actor.user_id {
            return Err(AppError::Unauthorized(format!(
                "caller is not the author of review {}",
                review.id
            )));
        }
        Ok(())
    }
}
