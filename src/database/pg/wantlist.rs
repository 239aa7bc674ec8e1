use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::{PgStore, in_key_order};
use crate::database::{EntityMeta, EntityStore};
use crate::error::AppResult;
use crate::models::UserWantlist;

#[derive(Debug, FromRow)]
struct UserWantlistRow {
    id: Uuid,
    username: String,
    exists_upstream: bool,
    release_ids: Vec<i64>,
    last_updated: DateTime<Utc>,
    created_on: Option<DateTime<Utc>>,
    modified_on: Option<DateTime<Utc>>,
}

impl From<UserWantlistRow> for UserWantlist {
    fn from(row: UserWantlistRow) -> Self {
        Self {
            meta: EntityMeta {
                id: Some(row.id),
                created_on: row.created_on,
                modified_on: row.modified_on,
            },
            username: row.username,
            exists: row.exists_upstream,
            release_ids: row.release_ids,
            last_updated: row.last_updated,
        }
    }
}

const COLUMNS: &str =
    "id, username, exists_upstream, release_ids, last_updated, created_on, modified_on";

#[async_trait]
impl EntityStore<UserWantlist> for PgStore {
    async fn get_by_key(&self, key: &str) -> AppResult<Option<UserWantlist>> {
        let row = sqlx::query_as::<_, UserWantlistRow>(&format!(
            "SELECT {} FROM user_wantlists WHERE username = $1",
            COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserWantlist::from))
    }

    async fn upsert(&self, entity: UserWantlist) -> AppResult<UserWantlist> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserWantlistRow>(&format!(
            r#"
            INSERT INTO user_wantlists
                (id, username, exists_upstream, release_ids, last_updated, created_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (username) DO UPDATE SET
                exists_upstream = EXCLUDED.exists_upstream,
                release_ids = EXCLUDED.release_ids,
                last_updated = EXCLUDED.last_updated,
                modified_on = $6
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(entity.meta.id.unwrap_or_else(Uuid::new_v4))
        .bind(&entity.username)
        .bind(entity.exists)
        .bind(&entity.release_ids)
        .bind(entity.last_updated)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            username = %row.username,
            wants = row.release_ids.len(),
            "Upserted user wantlist"
        );

        Ok(row.into())
    }

    async fn get_many_by_keys(&self, keys: &[String]) -> AppResult<Vec<UserWantlist>> {
        let rows = sqlx::query_as::<_, UserWantlistRow>(&format!(
            "SELECT {} FROM user_wantlists WHERE username = ANY($1)",
            COLUMNS
        ))
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        let rows = in_key_order(keys, rows, |row| row.username.as_str());
        Ok(rows.into_iter().map(UserWantlist::from).collect())
    }
}
