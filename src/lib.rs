use redis::Client as RedisClient;
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

pub mod cache;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod test_support;

use cache::{FreshnessCache, MemoryQuotaStore, QuotaStore, RedisQuotaStore};
use client::{DiscogsClient, HttpTransport};
use config::Config;
use database::{EntityStore, MemoryStore, PgStore};
use error::{AppError, AppResult};
use middleware::{GatedTransport, RateLimitGate};
use models::{SellerInventory, UserWantlist};
use services::{InventoryService, StockService, WantlistService};

/// Everything a caller needs, wired from one [`Config`].
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub inventories: InventoryService,
    pub wantlists: WantlistService,
    pub stock: StockService,
}

impl AppState {
    pub async fn build(config: Config) -> AppResult<Self> {
        let quota = quota_store(&config)?;
        let gate = Arc::new(RateLimitGate::from_config(quota, &config));
        let transport = GatedTransport::new(HttpTransport::new(&config)?, gate);
        let client = DiscogsClient::new(&config.discogs_api_url, Arc::new(transport))?;

        let (inventory_store, wantlist_store) = entity_stores(&config).await?;

        let inventories = InventoryService::new(
            client.clone(),
            FreshnessCache::new(inventory_store, config.inventory_ttl()),
        );
        let wantlists = WantlistService::new(
            client,
            FreshnessCache::new(wantlist_store, config.wantlist_ttl()),
        );
        let stock = StockService::new(inventories.clone(), wantlists.clone());

        Ok(AppState {
            config,
            inventories,
            wantlists,
            stock,
        })
    }
}

fn quota_store(config: &Config) -> AppResult<Arc<dyn QuotaStore>> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("No REDIS_URL set, tracking upstream quota in memory");
        return Ok(Arc::new(MemoryQuotaStore::new()));
    };

    let redis = RedisClient::open(redis_url.as_str())
        .map_err(|e| AppError::Config(format!("REDIS_URL: {}", e)))?;
    let host = reqwest::Url::parse(&config.discogs_api_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| config.discogs_api_url.clone());

    Ok(Arc::new(RedisQuotaStore::new(Arc::new(redis), &host)))
}

type Stores = (
    Arc<dyn EntityStore<SellerInventory>>,
    Arc<dyn EntityStore<UserWantlist>>,
);

async fn entity_stores(config: &Config) -> AppResult<Stores> {
    let Some(database_url) = &config.database_url else {
        tracing::info!("No DATABASE_URL set, keeping synced data in memory");
        let inventories: Arc<dyn EntityStore<SellerInventory>> = Arc::new(MemoryStore::new());
        let wantlists: Arc<dyn EntityStore<UserWantlist>> = Arc::new(MemoryStore::new());
        return Ok((inventories, wantlists));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'crate_sync';").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    let store = PgStore::new(pool);
    store.ensure_schema().await?;

    let inventories: Arc<dyn EntityStore<SellerInventory>> = Arc::new(store.clone());
    let wantlists: Arc<dyn EntityStore<UserWantlist>> = Arc::new(store);
    Ok((inventories, wantlists))
}
