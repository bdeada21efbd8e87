//! Review write path.
//!
//! Slim entry point for creating a review; everything around it (order
//! history, delivery checks, pagination) belongs to the CRUD layer. What
//! matters here is the contract with the aggregation engine: the review is
//! durably saved first, then ratings are recomputed synchronously.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use emporium_core::error::AppError;
use emporium_core::models::Review;
use emporium_db::{ProductRepository, ReviewRepository};

use crate::access::Actor;
use crate::aggregation::AggregationEngine;

const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    products: Arc<dyn ProductRepository>,
    aggregation: Arc<AggregationEngine>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        products: Arc<dyn ProductRepository>,
        aggregation: Arc<AggregationEngine>,
    ) -> Self {
        Self {
            reviews,
            products,
            aggregation,
        }
    }

    /// Create a review spanning one or more purchased products, then
    /// recompute the affected product and store ratings.
    pub async fn submit_review(
        &self,
        actor: &Actor,
        product_ids: Vec<Uuid>,
        rating: Decimal,
        comment: Option<String>,
    ) -> Result<Review, AppError> {
        if product_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "a review must reference at least one product".to_string(),
            ));
        }

        if rating < Decimal::from(MIN_RATING) || rating > Decimal::from(MAX_RATING) {
            return Err(AppError::InvalidInput(format!(
                "rating {} out of range {}..={}",
                rating, MIN_RATING, MAX_RATING
            )));
        }

        for product_id in &product_ids {
            self.products
                .get(*product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {} not found", product_id)))?;

            if self
                .reviews
                .exists_for_author_and_product(actor.user_id, *product_id)
                .await?
            {
                return Err(AppError::InvalidInput(format!(
                    "product {} already reviewed by this user",
                    product_id
                )));
            }
        }

        let mut review = Review::new(actor.user_id, product_ids, rating);
        review.comment = comment;

        self.reviews.insert(review.clone()).await?;
        tracing::info!(review_id = %review.id, rating = %rating, "Review created");

        self.aggregation.recompute_after_review(&review).await?;

        Ok(review)
    }
}
