//! Domain types
//!
//! These serialize to exactly the shapes the HTTP API returns, so a cached
//! listing snapshot is byte-identical to a freshly serialized store result.

use serde::{Deserialize, Serialize};

/// A review left on a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub reviewer: String,
    pub comment: String,
}

/// A book with its reviews.
///
/// Identity is store-assigned and immutable once created. Books and reviews
/// have no update or delete surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub reviews: Vec<Review>,
}
