use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::database::{Entity, EntityStore};
use crate::error::AppResult;
use crate::utils::is_expired;

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness<T> {
    /// Within the staleness window.
    Cached(T),
    /// Present but older than the window.
    Stale(T),
    Missing,
}

/// Per-key TTL view over an entity store.
///
/// The store record itself is the cache entry; `last_updated` on the record
/// decides its freshness and is only ever written through [`upsert`].
///
/// [`upsert`]: FreshnessCache::upsert
pub struct FreshnessCache<T> {
    store: Arc<dyn EntityStore<T>>,
    ttl: Duration,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<T> Clone for FreshnessCache<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ttl: self.ttl,
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<T: Entity> FreshnessCache<T> {
    pub fn new(store: Arc<dyn EntityStore<T>>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub async fn get(&self, key: &str) -> AppResult<Freshness<T>> {
        let entry = match self.store.get_by_key(key).await? {
            Some(entry) => entry,
            None => {
                tracing::debug!(key, "Cache miss");
                return Ok(Freshness::Missing);
            }
        };

        if is_expired(entry.last_updated(), self.ttl, Utc::now()) {
            tracing::debug!(key, last_updated = %entry.last_updated(), "Cache entry stale");
            Ok(Freshness::Stale(entry))
        } else {
            tracing::debug!(key, "Cache hit");
            Ok(Freshness::Cached(entry))
        }
    }

    /// Stamp `last_updated = now` and write the value through to the store.
    pub async fn upsert(&self, mut value: T) -> AppResult<T> {
        value.set_last_updated(Utc::now());
        self.store.upsert(value).await
    }

    /// Claim the refresh slot for `key`. `None` if a refresh is already running;
    /// the slot is released when the guard drops.
    pub fn begin_refresh(&self, key: &str) -> Option<RefreshGuard> {
        let mut in_flight = lock(&self.in_flight);
        if !in_flight.insert(key.to_string()) {
            return None;
        }

        Some(RefreshGuard {
            key: key.to_string(),
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_refreshing(&self, key: &str) -> bool {
        lock(&self.in_flight).contains(key)
    }
}

/// Single-flight token for one key's background refresh.
pub struct RefreshGuard {
    key: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl RefreshGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.key);
    }
}

fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    // the set stays consistent even if a holder panicked
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::UserWantlist;

    const TTL: Duration = Duration::from_secs(6 * 3600);

    fn cache() -> (Arc<MemoryStore<UserWantlist>>, FreshnessCache<UserWantlist>) {
        let store = Arc::new(MemoryStore::new());
        let cache = FreshnessCache::new(store.clone() as Arc<dyn EntityStore<UserWantlist>>, TTL);
        (store, cache)
    }

    fn aged(username: &str, age: chrono::Duration) -> UserWantlist {
        let mut wantlist = UserWantlist::new(username, vec![1, 2]);
        wantlist.last_updated = Utc::now() - age;
        wantlist
    }

    #[tokio::test]
    async fn classifies_entries_by_age() {
        let (store, cache) = cache();
        store.insert_raw(aged("fresh", chrono::Duration::hours(5))).await;
        store.insert_raw(aged("old", chrono::Duration::hours(7))).await;

        assert!(matches!(cache.get("fresh").await.unwrap(), Freshness::Cached(_)));
        assert!(matches!(cache.get("old").await.unwrap(), Freshness::Stale(_)));
        assert_eq!(cache.get("nobody").await.unwrap(), Freshness::Missing);
    }

    #[tokio::test]
    async fn upsert_restamps_last_updated() {
        let (_store, cache) = cache();

        let stored = cache
            .upsert(aged("digger", chrono::Duration::days(3)))
            .await
            .unwrap();

        assert!(Utc::now() - stored.last_updated < chrono::Duration::seconds(5));
        assert!(matches!(cache.get("digger").await.unwrap(), Freshness::Cached(_)));
    }

    #[tokio::test]
    async fn repeated_upserts_keep_one_record() {
        let (store, cache) = cache();
        for n in 1..=3 {
            cache
                .upsert(UserWantlist::new("digger", (1..=n).collect()))
                .await
                .unwrap();
        }

        assert_eq!(store.len().await, 1);
        match cache.get("digger").await.unwrap() {
            Freshness::Cached(w) => assert_eq!(w.release_ids, vec![1, 2, 3]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn refresh_is_single_flight_per_key() {
        let (_store, cache) = cache();

        let guard = cache.begin_refresh("digger").expect("first claim succeeds");
        assert!(cache.begin_refresh("digger").is_none());
        assert!(cache.clone().begin_refresh("digger").is_none());
        // other keys are independent
        assert!(cache.begin_refresh("someone-else").is_some());

        drop(guard);
        assert!(!cache.is_refreshing("digger"));
        assert!(cache.begin_refresh("digger").is_some());
    }
}
