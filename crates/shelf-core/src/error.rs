//! Error types for Shelf

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShelfError>;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl ShelfError {
    /// Wrap any store-engine failure as a `Store` error.
    pub fn store(e: impl std::fmt::Display) -> Self {
        ShelfError::Store(e.to_string())
    }
}
