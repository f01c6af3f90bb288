use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use storefront_catalog::{ReviewError, ReviewSummary};
use storefront_core::models::{CurrentUser, Rating, Review};

use crate::{error::AppError, extract::AppJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ReviewInput {
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewRequest {
    pub review: ReviewInput,
    pub productid: String,
    pub current_user: CurrentUser,
}

/// `averageRating` and `totalReviews` are `null` when the CMS was not updated
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewResponse {
    pub message: &'static str,
    pub review: Review,
    pub average_rating: Option<f64>,
    pub total_reviews: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CheckReviewRequest {
    pub productid: String,
    pub userid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReviewResponse {
    pub has_reviewed: bool,
    pub review: Option<Review>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/addreview", post(add_review))
        .route("/api/products/getreviews/{productid}", get(get_reviews))
        .route("/api/products/checkreview", post(check_review))
}

fn review_failure(err: ReviewError) -> AppError {
    AppError::storage(err)
}

async fn add_review(
    State(state): State<AppState>,
    AppJson(req): AppJson<AddReviewRequest>,
) -> Result<Json<AddReviewResponse>, AppError> {
    let rating = Rating::try_from(req.review.rating).map_err(|e| AppError::ValidationError(e.to_string()))?;
    if req.review.comment.trim().is_empty() {
        return Err(AppError::ValidationError("review comment is required".to_string()));
    }

    let submission = state
        .reviews
        .submit_review(&req.productid, &req.current_user, rating, req.review.comment)
        .await
        .map_err(review_failure)?;

    let (average_rating, total_reviews) = match submission.rating_update {
        Some(update) => (Some(update.average_rating), Some(update.total_reviews)),
        None => (None, None),
    };

    Ok(Json(AddReviewResponse {
        message: "Review submitted successfully",
        review: submission.review,
        average_rating,
        total_reviews,
    }))
}

async fn get_reviews(
    State(state): State<AppState>,
    Path(productid): Path<String>,
) -> Result<Json<ReviewSummary>, AppError> {
    let summary = state.reviews.list_reviews(&productid).await.map_err(review_failure)?;
    Ok(Json(summary))
}

async fn check_review(
    State(state): State<AppState>,
    AppJson(req): AppJson<CheckReviewRequest>,
) -> Result<Json<CheckReviewResponse>, AppError> {
    let review = state
        .reviews
        .find_existing_review(&req.productid, &req.userid)
        .await
        .map_err(review_failure)?;

    Ok(Json(CheckReviewResponse { has_reviewed: review.is_some(), review }))
}
