use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::cache::keys::quota_key;
use crate::cache::models::Quota;

/// TTL-keyed holder of the single shared quota record.
///
/// An expired record reads as absent. Implementations never fail: a backend
/// problem is logged and treated as "no quota known", so callers fail open.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn load(&self) -> Option<Quota>;

    async fn store(&self, quota: Quota, ttl: Duration);
}

/// In-process quota record for a single-instance deployment.
#[derive(Default)]
pub struct MemoryQuotaStore {
    slot: Mutex<Option<(Quota, Instant)>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn load(&self) -> Option<Quota> {
        let mut slot = self.slot.lock().await;
        match *slot {
            Some((quota, expires_at)) if Instant::now() < expires_at => Some(quota),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    async fn store(&self, quota: Quota, ttl: Duration) {
        let mut slot = self.slot.lock().await;
        *slot = Some((quota, Instant::now() + ttl));
    }
}

/// Quota record kept in Redis so several instances share one budget.
pub struct RedisQuotaStore {
    redis: Arc<RedisClient>,
    key: String,
}

impl RedisQuotaStore {
    pub fn new(redis: Arc<RedisClient>, host: &str) -> Self {
        Self {
            redis,
            key: quota_key(host),
        }
    }

    async fn try_load(&self) -> Result<Option<Quota>, redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(&self.key).await?;

        match result {
            Some(json) => {
                let quota = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(quota))
            }
            None => Ok(None),
        }
    }

    async fn try_store(&self, quota: Quota, ttl: Duration) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let json = serde_json::to_string(&quota).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::IoError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        // SETEX rejects a zero expiry
        let ttl_secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(&self.key, json, ttl_secs).await?;

        Ok(())
    }
}

#[async_trait]
impl QuotaStore for RedisQuotaStore {
    async fn load(&self) -> Option<Quota> {
        match self.try_load().await {
            Ok(quota) => quota,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read quota from redis");
                None
            }
        }
    }

    async fn store(&self, quota: Quota, ttl: Duration) {
        if let Err(e) = self.try_store(quota, ttl).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to write quota to redis");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test(start_paused = true)]
    async fn memory_store_expires_after_ttl() {
        let store = MemoryQuotaStore::new();
        assert_eq!(store.load().await, None);

        let quota = Quota::new(0, Utc::now());
        store.store(quota, Duration::from_secs(60)).await;
        assert_eq!(store.load().await, Some(quota));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(store.load().await, Some(quota));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.load().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn memory_store_overwrites_and_resets_ttl() {
        let store = MemoryQuotaStore::new();
        store.store(Quota::new(5, Utc::now()), Duration::from_secs(10)).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        let newer = Quota::new(4, Utc::now());
        store.store(newer, Duration::from_secs(10)).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        assert_eq!(store.load().await, Some(newer));
    }
}
