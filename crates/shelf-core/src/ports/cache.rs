//! Cache trait for the volatile listing cache
//!
//! Reads return a three-way `CacheRead` instead of a `Result` so backend
//! failures cannot accidentally propagate: a backend that is down folds
//! into `Unavailable` at the backend boundary, and the coordinator's
//! degrade-to-store policy is an explicit branch.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheRead {
    /// Backend answered with a value. Raw bytes; decoding is the caller's.
    Hit(Vec<u8>),
    /// Backend reachable, no value under the key.
    Miss,
    /// Backend unreachable, errored, or timed out.
    Unavailable,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cache operation timed out")]
    Timeout,
}

/// A volatile key-value cache with per-entry TTL.
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Read a key. Never errors; backend failures become `Unavailable`.
    async fn get(&self, key: &str) -> CacheRead;

    /// Write a key with a TTL, overwriting any previous value. Errors are
    /// the caller's to absorb or surface.
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}
