//! Redis cache backend
//!
//! Holds one long-lived `ConnectionManager` acquired lazily and reused
//! across requests (it self-heals transient drops). Every operation runs
//! under an aggressive sub-second timeout so a degraded Redis cannot
//! stall the store-authoritative path.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use shelf_core::ports::{CacheError, CacheRead, ListingCache};
use shelf_core::ShelfError;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub struct RedisCache {
    client: redis::Client,
    conn: RwLock<Option<ConnectionManager>>,
    op_timeout: Duration,
}

impl RedisCache {
    pub fn new(url: &str, op_timeout: Duration) -> shelf_core::Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ShelfError::Config(format!("invalid cache URL: {}", e)))?;

        Ok(Self {
            client,
            conn: RwLock::new(None),
            op_timeout,
        })
    }

    /// Eager connect at startup. Non-fatal; a failure here only means the
    /// first requests run against the store until Redis comes up.
    pub async fn connect(&self) {
        match self.handle().await {
            Some(_) => info!("Redis cache connected"),
            None => warn!("Redis cache unreachable at startup, degrading to store"),
        }
    }

    /// Current connection handle, or one bounded acquisition attempt if
    /// none is held yet. No in-call retry.
    async fn handle(&self) -> Option<ConnectionManager> {
        if let Some(conn) = self.conn.read().await.clone() {
            return Some(conn);
        }

        let mut guard = self.conn.write().await;
        // Another task may have connected while we waited on the lock
        if let Some(conn) = guard.clone() {
            return Some(conn);
        }

        match timeout(self.op_timeout, ConnectionManager::new(self.client.clone())).await {
            Ok(Ok(conn)) => {
                debug!("Redis connection established");
                *guard = Some(conn.clone());
                Some(conn)
            }
            Ok(Err(e)) => {
                warn!("Redis connection failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Redis connection attempt timed out");
                None
            }
        }
    }
}

#[async_trait]
impl ListingCache for RedisCache {
    async fn get(&self, key: &str) -> CacheRead {
        let Some(mut conn) = self.handle().await else {
            return CacheRead::Unavailable;
        };

        match timeout(self.op_timeout, conn.get::<_, Option<Vec<u8>>>(key)).await {
            Ok(Ok(Some(value))) => CacheRead::Hit(value),
            Ok(Ok(None)) => CacheRead::Miss,
            Ok(Err(e)) => {
                warn!("Redis GET {} failed: {}", key, e);
                CacheRead::Unavailable
            }
            Err(_) => {
                warn!("Redis GET {} timed out", key);
                CacheRead::Unavailable
            }
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let Some(mut conn) = self.handle().await else {
            return Err(CacheError::Unavailable("no connection".to_string()));
        };

        match timeout(
            self.op_timeout,
            conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_config_error() {
        match RedisCache::new("not a url", Duration::from_millis(50)) {
            Err(ShelfError::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades() {
        // Port 1 refuses connections; the read must fold into Unavailable
        let cache = RedisCache::new("redis://127.0.0.1:1/", Duration::from_millis(100)).unwrap();

        assert_eq!(cache.get("books:all").await, CacheRead::Unavailable);
        assert!(cache
            .put("books:all", vec![1], Duration::from_secs(60))
            .await
            .is_err());
    }
}
