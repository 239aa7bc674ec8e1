use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::store::{Entity, EntityStore};
use crate::error::AppResult;

/// Store kept in process memory. Used when no database is configured.
pub struct MemoryStore<T> {
    records: RwLock<HashMap<String, T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a record as-is, bypassing id and timestamp stamping.
    pub async fn insert_raw(&self, entity: T) {
        self.records
            .write()
            .await
            .insert(entity.key().to_string(), entity);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    async fn get_by_key(&self, key: &str) -> AppResult<Option<T>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn upsert(&self, mut entity: T) -> AppResult<T> {
        let mut records = self.records.write().await;

        let existing = records.get(entity.key()).map(|e| e.meta().clone());
        entity.meta_mut().stamp(existing.as_ref(), Utc::now());

        records.insert(entity.key().to_string(), entity.clone());
        Ok(entity)
    }

    async fn get_many_by_keys(&self, keys: &[String]) -> AppResult<Vec<T>> {
        let records = self.records.read().await;
        Ok(keys.iter().filter_map(|key| records.get(key).cloned()).collect())
    }
}
