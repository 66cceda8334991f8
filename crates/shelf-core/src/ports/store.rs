//! Storage trait for the durable book store

use crate::types::{Book, Review};
use crate::Result;
use async_trait::async_trait;

/// The authoritative book store. Always correct; failures here are fatal
/// to the request.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by id, each with its reviews ordered by id.
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// Insert a book and return it with its assigned identity.
    async fn create_book(&self, title: &str, author: &str) -> Result<Book>;

    /// Reviews for a book, ordered by id. `BookNotFound` if the book
    /// does not exist.
    async fn list_reviews(&self, book_id: i64) -> Result<Vec<Review>>;

    /// Insert a review for a book. `BookNotFound` if the book does not
    /// exist.
    async fn create_review(&self, book_id: i64, reviewer: &str, comment: &str) -> Result<Review>;
}
