use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::{PgStore, in_key_order};
use crate::database::{EntityMeta, EntityStore};
use crate::error::AppResult;
use crate::models::{SellerInventory, SellerListing};

#[derive(Debug, FromRow)]
struct SellerInventoryRow {
    id: Uuid,
    username: String,
    avatar_url: String,
    exists_upstream: bool,
    inventory: Json<Vec<SellerListing>>,
    last_updated: DateTime<Utc>,
    created_on: Option<DateTime<Utc>>,
    modified_on: Option<DateTime<Utc>>,
}

impl From<SellerInventoryRow> for SellerInventory {
    fn from(row: SellerInventoryRow) -> Self {
        Self {
            meta: EntityMeta {
                id: Some(row.id),
                created_on: row.created_on,
                modified_on: row.modified_on,
            },
            username: row.username,
            avatar_url: row.avatar_url,
            exists: row.exists_upstream,
            inventory: row.inventory.0,
            last_updated: row.last_updated,
        }
    }
}

const COLUMNS: &str =
    "id, username, avatar_url, exists_upstream, inventory, last_updated, created_on, modified_on";

#[async_trait]
impl EntityStore<SellerInventory> for PgStore {
    async fn get_by_key(&self, key: &str) -> AppResult<Option<SellerInventory>> {
        let row = sqlx::query_as::<_, SellerInventoryRow>(&format!(
            "SELECT {} FROM seller_inventories WHERE username = $1",
            COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SellerInventory::from))
    }

    async fn upsert(&self, entity: SellerInventory) -> AppResult<SellerInventory> {
        let now = Utc::now();

        // a conflicting row keeps its id and created_on
        let row = sqlx::query_as::<_, SellerInventoryRow>(&format!(
            r#"
            INSERT INTO seller_inventories
                (id, username, avatar_url, exists_upstream, inventory, last_updated, created_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (username) DO UPDATE SET
                avatar_url = EXCLUDED.avatar_url,
                exists_upstream = EXCLUDED.exists_upstream,
                inventory = EXCLUDED.inventory,
                last_updated = EXCLUDED.last_updated,
                modified_on = $7
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(entity.meta.id.unwrap_or_else(Uuid::new_v4))
        .bind(&entity.username)
        .bind(&entity.avatar_url)
        .bind(entity.exists)
        .bind(Json(&entity.inventory))
        .bind(entity.last_updated)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            username = %row.username,
            listings = row.inventory.0.len(),
            "Upserted seller inventory"
        );

        Ok(row.into())
    }

    async fn get_many_by_keys(&self, keys: &[String]) -> AppResult<Vec<SellerInventory>> {
        let rows = sqlx::query_as::<_, SellerInventoryRow>(&format!(
            "SELECT {} FROM seller_inventories WHERE username = ANY($1)",
            COLUMNS
        ))
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        let rows = in_key_order(keys, rows, |row| row.username.as_str());
        Ok(rows.into_iter().map(SellerInventory::from).collect())
    }
}
