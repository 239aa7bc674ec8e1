use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;

/// Bookkeeping columns shared by every persisted record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityMeta {
    pub id: Option<Uuid>,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
}

impl EntityMeta {
    /// Assign an id and creation time on first insert; stamp the
    /// modification time afterwards.
    pub fn stamp(&mut self, existing: Option<&EntityMeta>, now: DateTime<Utc>) {
        match existing.and_then(|meta| meta.id.map(|id| (id, meta.created_on))) {
            Some((id, created_on)) => {
                self.id = Some(id);
                self.created_on = created_on;
                self.modified_on = Some(now);
            }
            None => {
                self.id = Some(self.id.unwrap_or_else(Uuid::new_v4));
                self.created_on = Some(now);
                self.modified_on = None;
            }
        }
    }
}

/// A record addressed by a case-sensitive natural key (seller or user name).
pub trait Entity: Clone + Send + Sync + 'static {
    fn key(&self) -> &str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn last_updated(&self) -> DateTime<Utc>;

    fn set_last_updated(&mut self, at: DateTime<Utc>);
}

/// Persistent store for one entity kind. `upsert` matches on the natural key.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    async fn get_by_key(&self, key: &str) -> AppResult<Option<T>>;

    /// Insert or replace the record for `entity.key()` and return it as stored.
    async fn upsert(&self, entity: T) -> AppResult<T>;

    /// Records for the given keys, in key order. Unknown keys are skipped.
    async fn get_many_by_keys(&self, keys: &[String]) -> AppResult<Vec<T>>;
}
