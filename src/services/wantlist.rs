use std::collections::HashSet;
use tokio::task::JoinHandle;

use crate::cache::{Freshness, FreshnessCache};
use crate::client::DiscogsClient;
use crate::error::{AppError, AppResult};
use crate::models::{UserWantlist, Want, WantlistResponse};
use crate::utils::is_blank;

/// User want-lists. Small enough to fetch whole and write once.
#[derive(Clone)]
pub struct WantlistService {
    client: DiscogsClient,
    cache: FreshnessCache<UserWantlist>,
}

impl WantlistService {
    pub fn new(client: DiscogsClient, cache: FreshnessCache<UserWantlist>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FreshnessCache<UserWantlist> {
        &self.cache
    }

    /// Whether the user exists upstream. One first-page request, nothing stored.
    pub async fn exists(&self, username: &str) -> AppResult<bool> {
        if is_blank(username) {
            return Err(AppError::validation("username"));
        }

        Ok(self.client.wantlist_first_page(username).await?.is_some())
    }

    pub async fn get(&self, username: &str) -> AppResult<UserWantlist> {
        if is_blank(username) {
            return Err(AppError::validation("username"));
        }

        match self.cache.get(username).await? {
            Freshness::Cached(wantlist) => Ok(wantlist),
            Freshness::Stale(wantlist) => {
                self.schedule_refresh(username);
                Ok(wantlist)
            }
            Freshness::Missing => self.sync(username).await,
        }
    }

    pub fn schedule_refresh(&self, username: &str) -> Option<JoinHandle<()>> {
        let Some(guard) = self.cache.begin_refresh(username) else {
            tracing::debug!(username, "Wantlist refresh already in flight");
            return None;
        };

        let service = self.clone();
        Some(tokio::spawn(async move {
            let username = guard.key().to_string();
            if let Err(e) = service.sync(&username).await {
                tracing::warn!(username = %username, error = %e, "Wantlist refresh failed");
            }
            drop(guard);
        }))
    }

    /// Fetch the whole want-list and persist it in a single write. Any failure
    /// propagates and leaves the store untouched.
    pub async fn sync(&self, username: &str) -> AppResult<UserWantlist> {
        let first = match self.client.wantlist_first_page(username).await? {
            Some(page) => page,
            None => {
                tracing::info!(username, "User not found upstream");
                return self.cache.upsert(UserWantlist::not_found(username)).await;
            }
        };

        let wants = self.client.walker().walk::<WantlistResponse>(first).await?;
        let release_ids = release_ids(&wants);

        tracing::info!(username, wants = release_ids.len(), "Wantlist sync finished");

        self.cache
            .upsert(UserWantlist::new(username, release_ids))
            .await
    }
}

/// Release ids in upstream order, first occurrence only.
fn release_ids(wants: &[Want]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(wants.len());
    wants
        .iter()
        .map(|w| w.release_id)
        .filter(|id| seen.insert(*id))
        .collect()
}
