//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shelf_core::ShelfError;

/// An error ready to be rendered as `{"detail": ...}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<ShelfError> for ApiError {
    fn from(e: ShelfError) -> Self {
        match e {
            ShelfError::BookNotFound(_) => ApiError {
                status: StatusCode::NOT_FOUND,
                detail: "Book not found".to_string(),
            },
            ShelfError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "internal server error".to_string(),
                }
            }
            ShelfError::Config(msg) => {
                tracing::error!("Config error surfaced at request time: {}", msg);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "internal server error".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
