//! In-memory cache using DashMap (used when no Redis URL is configured)

use async_trait::async_trait;
use dashmap::DashMap;
use shelf_core::ports::{CacheError, CacheRead, ListingCache};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// In-process cache with per-entry TTL. Never reports `Unavailable`.
pub struct MemoryCache {
    data: Arc<DashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        let cache = Self {
            data: Arc::new(DashMap::new()),
        };

        cache.start_cleanup_task();

        cache
    }

    fn start_cleanup_task(&self) {
        let data = self.data.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;

                let now = Instant::now();
                let expired: Vec<String> = data
                    .iter()
                    .filter(|entry| now > entry.expires_at)
                    .map(|entry| entry.key().clone())
                    .collect();

                for key in expired {
                    data.remove(&key);
                }
            }
        });
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheRead {
        match self.data.get(key) {
            Some(entry) if Instant::now() > entry.expires_at => {
                drop(entry);
                self.data.remove(key);
                CacheRead::Miss
            }
            Some(entry) => CacheRead::Hit(entry.value.clone()),
            None => CacheRead::Miss,
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.data.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let cache = MemoryCache::new();

        cache
            .put("key1", vec![1, 2, 3], Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("key1").await, CacheRead::Hit(vec![1, 2, 3]));

        assert_eq!(cache.get("nonexistent").await, CacheRead::Miss);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = MemoryCache::new();

        cache
            .put("key1", vec![1], Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("key1", vec![2], Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("key1").await, CacheRead::Hit(vec![2]));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = MemoryCache::new();

        cache
            .put("key1", vec![1, 2, 3], Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(cache.get("key1").await, CacheRead::Hit(vec![1, 2, 3]));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get("key1").await, CacheRead::Miss);
    }
}
