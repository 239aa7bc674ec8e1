// Postgres-backed entity store
// One table per entity kind, keyed by the unique upstream name.

mod inventory;
mod wantlist;

use sqlx::{Executor, PgPool};

use crate::error::AppResult;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS seller_inventories (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    avatar_url TEXT NOT NULL DEFAULT '',
    exists_upstream BOOLEAN NOT NULL,
    inventory JSONB NOT NULL,
    last_updated TIMESTAMPTZ NOT NULL,
    created_on TIMESTAMPTZ,
    modified_on TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS user_wantlists (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    exists_upstream BOOLEAN NOT NULL,
    release_ids BIGINT[] NOT NULL,
    last_updated TIMESTAMPTZ NOT NULL,
    created_on TIMESTAMPTZ,
    modified_on TIMESTAMPTZ
);
"#;

/// Entity store over a Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tables if they are missing.
    pub async fn ensure_schema(&self) -> AppResult<()> {
        self.pool.execute(SCHEMA).await?;
        Ok(())
    }
}

/// Reorder rows to follow `keys`; rows for unknown keys are dropped.
fn in_key_order<T>(keys: &[String], mut rows: Vec<T>, key_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut ordered = Vec::with_capacity(rows.len());
    for key in keys {
        if let Some(pos) = rows.iter().position(|row| key_of(row) == key) {
            ordered.push(rows.swap_remove(pos));
        }
    }
    ordered
}
