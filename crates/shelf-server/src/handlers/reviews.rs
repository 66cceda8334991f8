//! Review handlers

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shelf_core::Review;

pub async fn list(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = state.catalog.list_reviews(book_id).await?;
    Ok(Json(reviews))
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    reviewer: String,
    comment: String,
}

pub async fn create(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    let review = state
        .catalog
        .create_review(book_id, &req.reviewer, &req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
