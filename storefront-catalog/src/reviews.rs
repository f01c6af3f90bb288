use std::sync::Arc;

use serde::Serialize;
use storefront_core::cms::{CatalogCms, CmsError, RatingAutomationPayload};
use storefront_core::models::{CurrentUser, Rating, Review};
use storefront_core::repository::ReviewRepository;
use tracing::{info, warn};

use crate::rating::{mean_rating, next_average, RatingUpdate};

/// Outcome of a review submission. `rating_update` is `None` when the CMS
/// could not be brought up to date; the review itself is stored regardless.
#[derive(Debug, Clone)]
pub struct ReviewSubmission {
    pub review: Review,
    pub rating_update: Option<RatingUpdate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub total_reviews: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Failed to save review: {0}")]
    PersistFailed(String),
    #[error("Failed to load reviews: {0}")]
    QueryFailed(String),
}

/// Stores reviews and keeps the CMS aggregate rating in step, best effort
pub struct ReviewService {
    repo: Arc<dyn ReviewRepository>,
    cms: Arc<dyn CatalogCms>,
}

impl ReviewService {
    pub fn new(repo: Arc<dyn ReviewRepository>, cms: Arc<dyn CatalogCms>) -> Self {
        Self { repo, cms }
    }

    pub async fn submit_review(
        &self,
        product_id: &str,
        author: &CurrentUser,
        rating: Rating,
        comment: String,
    ) -> Result<ReviewSubmission, ReviewError> {
        let review = Review::new(product_id.to_string(), author, rating, comment);
        self.repo
            .create_review(&review)
            .await
            .map_err(|e| ReviewError::PersistFailed(e.to_string()))?;

        let rating_update = match self.update_cms_rating(product_id, rating).await {
            Ok(update) => Some(update),
            Err(e) => {
                warn!("Review {} saved but CMS rating for {} not updated: {}", review.id, product_id, e);
                None
            }
        };

        Ok(ReviewSubmission { review, rating_update })
    }

    async fn update_cms_rating(&self, product_id: &str, rating: Rating) -> Result<RatingUpdate, CmsError> {
        let entry = self.cms.fetch_entry(product_id).await?;
        let update = next_average(entry.rating, entry.total_reviews, rating);

        self.cms
            .run_rating_automation(&RatingAutomationPayload {
                uid: product_id.to_string(),
                ratings: update.average_rating,
                total_reviews: update.total_reviews,
            })
            .await?;

        info!(
            "Rating updated in CMS for {}: {} -> {} ({} reviews)",
            product_id, entry.rating, update.average_rating, update.total_reviews
        );
        Ok(update)
    }

    /// Reviews for a product, newest first, with a locally computed average
    pub async fn list_reviews(&self, product_id: &str) -> Result<ReviewSummary, ReviewError> {
        let reviews = self
            .repo
            .list_reviews(product_id)
            .await
            .map_err(|e| ReviewError::QueryFailed(e.to_string()))?;

        Ok(ReviewSummary {
            average_rating: mean_rating(&reviews),
            total_reviews: reviews.len(),
            reviews,
        })
    }

    /// Advisory only: nothing stops a second review from being written
    pub async fn find_existing_review(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<Option<Review>, ReviewError> {
        self.repo
            .find_review(product_id, user_id)
            .await
            .map_err(|e| ReviewError::QueryFailed(e.to_string()))
    }
}
