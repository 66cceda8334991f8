//! Catalog service with the cache-aside listing read path
//!
//! The cache is purely an optimization: any doubt about its content
//! (miss, corrupt value, unreachable backend) falls back to the store,
//! and cache population never affects the response. Writes pass through
//! to the store and never touch the cache; staleness up to the TTL is
//! tolerated by design.

use shelf_core::ports::{BookStore, CacheRead, ListingCache};
use shelf_core::{Book, Result, Review};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed key for the whole-catalog listing snapshot.
pub const BOOKS_CACHE_KEY: &str = "books:all";

/// How long a cached listing stays trusted.
pub const BOOKS_CACHE_TTL: Duration = Duration::from_secs(60);

pub struct CatalogService {
    store: Arc<dyn BookStore>,
    cache: Arc<dyn ListingCache>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>, cache: Arc<dyn ListingCache>) -> Self {
        Self { store, cache }
    }

    /// List all books, serving from the cache when it can answer.
    ///
    /// Store errors propagate unchanged; cache errors never do.
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        match self.cache.get(BOOKS_CACHE_KEY).await {
            CacheRead::Hit(bytes) => match serde_json::from_slice::<Vec<Book>>(&bytes) {
                Ok(books) => {
                    debug!("Cache hit for {}", BOOKS_CACHE_KEY);
                    return Ok(books);
                }
                // Present-but-corrupt is a miss, never an error
                Err(e) => warn!("Discarding corrupt cache entry for {}: {}", BOOKS_CACHE_KEY, e),
            },
            CacheRead::Miss => debug!("Cache miss for {}", BOOKS_CACHE_KEY),
            CacheRead::Unavailable => debug!("Cache unavailable, serving from store"),
        }

        let books = self.store.list_books().await?;

        match serde_json::to_vec(&books) {
            Ok(bytes) => {
                if let Err(e) = self.cache.put(BOOKS_CACHE_KEY, bytes, BOOKS_CACHE_TTL).await {
                    warn!("Cache population failed: {}", e);
                } else {
                    debug!("Cache populated for {}", BOOKS_CACHE_KEY);
                }
            }
            Err(e) => warn!("Failed to serialize listing for cache: {}", e),
        }

        Ok(books)
    }

    pub async fn create_book(&self, title: &str, author: &str) -> Result<Book> {
        self.store.create_book(title, author).await
    }

    pub async fn list_reviews(&self, book_id: i64) -> Result<Vec<Review>> {
        self.store.list_reviews(book_id).await
    }

    pub async fn create_review(
        &self,
        book_id: i64,
        reviewer: &str,
        comment: &str,
    ) -> Result<Review> {
        self.store.create_review(book_id, reviewer, comment).await
    }
}
