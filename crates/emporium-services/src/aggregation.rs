//! Rating aggregation.
//!
//! Recomputes a product's rating from its reviews and the owning store's
//! rating from its products, after every successful review write. The math is
//! exact decimal arithmetic; the rounding rule is half-up (midpoint away from
//! zero) at one decimal place, so a mean of 4.25 becomes 4.3.
//!
//! Concurrency: read-then-write with no cross-request lock. Two reviews
//! landing at once may both recompute; the later write wins. The aggregate is
//! a rolling approximation, so last-writer-wins is the accepted policy.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::{Review, SearchDocPatch};
use emporium_db::{ProductRepository, ReviewRepository, StoreRepository};

use crate::search_sync::SearchIndexSync;

/// Round to one decimal place, midpoint away from zero.
pub fn round_rating(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounded mean, or `None` for an empty set.
fn mean_rating(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().copied().sum();
    Some(round_rating(sum / Decimal::from(values.len() as u64)))
}

pub struct AggregationEngine {
    products: Arc<dyn ProductRepository>,
    stores: Arc<dyn StoreRepository>,
    reviews: Arc<dyn ReviewRepository>,
    search: Arc<SearchIndexSync>,
}

impl AggregationEngine {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        stores: Arc<dyn StoreRepository>,
        reviews: Arc<dyn ReviewRepository>,
        search: Arc<SearchIndexSync>,
    ) -> Self {
        Self {
            products,
            stores,
            reviews,
            search,
        }
    }

    /// Recompute ratings for every product the review references, then for
    /// each product's owning store. Invoked synchronously right after the
    /// review is durably saved.
    pub async fn recompute_after_review(&self, review: &Review) -> Result<(), AppError> {
        for product_id in &review.product_ids {
            self.recompute_product(*product_id).await?;
        }
        Ok(())
    }

    async fn recompute_product(&self, product_id: Uuid) -> Result<(), AppError> {
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {} not found", product_id)))?;

        let reviews = self.reviews.list_for_product(product_id).await?;
        let ratings: Vec<Decimal> = reviews.iter().map(|review| review.rating).collect();
        let rating = mean_rating(&ratings);

        self.products.set_rating(product_id, rating).await?;
        tracing::debug!(
            product_id = %product_id,
            reviews = ratings.len(),
            rating = ?rating,
            "Product rating recomputed"
        );

        if let Err(e) = self
            .search
            .reconcile(product_id, SearchDocPatch::rating(rating))
            .await
        {
            tracing::warn!(
                error = %e,
                product_id = %product_id,
                "Rating updated but search index sync failed; index left stale"
            );
        }

        self.recompute_store(product.store_id).await
    }

    /// Store rating: mean over the store's rated products only. A store with
    /// no rated products yet carries 0.
    async fn recompute_store(&self, store_id: Uuid) -> Result<(), AppError> {
        let products = self.products.list_by_store(store_id).await?;
        let ratings: Vec<Decimal> = products
            .iter()
            .filter_map(|product| product.rating)
            .collect();
        let rating = mean_rating(&ratings).unwrap_or(Decimal::ZERO);

        self.stores.set_rating(store_id, rating).await?;
        tracing::debug!(
            store_id = %store_id,
            rated_products = ratings.len(),
            rating = %rating,
            "Store rating recomputed"
        );

        Ok(())
    }
}
