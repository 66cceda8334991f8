//! Book handlers

use crate::error::ApiError;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shelf_core::Book;

/// `GET /books`, served through the cache-aside coordinator.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.catalog.list_books().await?;
    Ok(Json(books))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    title: String,
    author: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = state.catalog.create_book(&req.title, &req.author).await?;
    Ok((StatusCode::CREATED, Json(book)))
}
