//! Port traits (interfaces) for dependency injection

pub mod cache;
pub mod store;

pub use cache::{CacheError, CacheRead, ListingCache};
pub use store::BookStore;
