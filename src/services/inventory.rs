use futures_util::StreamExt;
use std::collections::HashSet;
use std::pin::pin;
use tokio::task::JoinHandle;

use crate::cache::{Freshness, FreshnessCache};
use crate::client::DiscogsClient;
use crate::error::{AppError, AppResult};
use crate::models::{InventoryResponse, Listing, SellerInventory, SellerListing};
use crate::utils::is_blank;

/// Seller inventories, fetched page by page and persisted after every page.
#[derive(Clone)]
pub struct InventoryService {
    client: DiscogsClient,
    cache: FreshnessCache<SellerInventory>,
}

/// Listings accumulated during one sync, deduplicated by listing id.
struct InventoryMerge {
    sellername: String,
    avatar_url: Option<String>,
    seen: HashSet<i64>,
    listings: Vec<SellerListing>,
}

impl InventoryMerge {
    fn new(sellername: &str) -> Self {
        Self {
            sellername: sellername.to_string(),
            avatar_url: None,
            seen: HashSet::new(),
            listings: Vec::new(),
        }
    }

    /// Append listings not seen before; the first occurrence of an id wins.
    fn extend(&mut self, listings: &[Listing]) {
        if self.avatar_url.is_none() {
            self.avatar_url = listings.first().map(|l| l.seller.avatar_url.clone());
        }
        for listing in listings {
            if self.seen.insert(listing.id) {
                self.listings.push(SellerListing::from(listing));
            }
        }
    }

    /// The inventory to persist: everything merged so far, followed by the
    /// listings of `carry_over` that have not been seen yet.
    fn snapshot(&self, carry_over: Option<&SellerInventory>) -> SellerInventory {
        let mut listings = self.listings.clone();
        let mut avatar_url = self.avatar_url.clone();

        if let Some(previous) = carry_over {
            listings.extend(
                previous
                    .inventory
                    .iter()
                    .filter(|l| !self.seen.contains(&l.id))
                    .cloned(),
            );
            avatar_url = avatar_url.or_else(|| Some(previous.avatar_url.clone()));
        }

        SellerInventory::new(&self.sellername, avatar_url.unwrap_or_default(), listings)
    }
}

impl InventoryService {
    pub fn new(client: DiscogsClient, cache: FreshnessCache<SellerInventory>) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &FreshnessCache<SellerInventory> {
        &self.cache
    }

    /// Serve a seller's inventory, fetching it only when nothing is cached.
    ///
    /// A stale entry is returned as-is while a background refresh runs.
    pub async fn get(&self, sellername: &str) -> AppResult<SellerInventory> {
        if is_blank(sellername) {
            return Err(AppError::validation("sellername"));
        }

        match self.cache.get(sellername).await? {
            Freshness::Cached(inventory) => Ok(inventory),
            Freshness::Stale(inventory) => {
                self.schedule_refresh(inventory.clone());
                Ok(inventory)
            }
            Freshness::Missing => self.sync(sellername, None).await,
        }
    }

    /// Start a background refresh of `stale` unless one is already running
    /// for the same seller.
    pub fn schedule_refresh(&self, stale: SellerInventory) -> Option<JoinHandle<()>> {
        let Some(guard) = self.cache.begin_refresh(&stale.username) else {
            tracing::debug!(seller = %stale.username, "Inventory refresh already in flight");
            return None;
        };

        let service = self.clone();
        Some(tokio::spawn(async move {
            let seller = guard.key().to_string();
            match service.sync(&seller, Some(&stale)).await {
                Ok(inventory) => tracing::info!(
                    seller = %seller,
                    listings = inventory.inventory.len(),
                    "Refreshed stale inventory"
                ),
                Err(e) => tracing::warn!(seller = %seller, error = %e, "Inventory refresh failed"),
            }
            drop(guard);
        }))
    }

    /// Fetch the seller's inventory from upstream, persisting after each page.
    ///
    /// `previous` is the stale snapshot being replaced, if any. Until the last
    /// page has been merged, its not-yet-seen listings are kept in the persisted
    /// state so a failed refresh never shrinks the inventory.
    ///
    /// A failure on any page after the first ends the walk early and returns
    /// what has been persisted so far.
    pub async fn sync(
        &self,
        sellername: &str,
        previous: Option<&SellerInventory>,
    ) -> AppResult<SellerInventory> {
        let first = match self.client.inventory_first_page(sellername).await? {
            Some(page) => page,
            None => {
                tracing::info!(seller = sellername, "Seller not found upstream");
                return self.cache.upsert(SellerInventory::not_found(sellername)).await;
            }
        };

        let total_pages = first.total_pages;
        let mut merge = InventoryMerge::new(sellername);
        merge.extend(&first.items);
        let mut latest = self
            .cache
            .upsert(merge.snapshot(previous.filter(|_| !first.is_last())))
            .await?;

        let mut pages_synced = 1;
        let mut rest = pin!(
            self.client
                .walker()
                .pages::<InventoryResponse>(first)
                .skip(1)
        );

        while let Some(next) = rest.next().await {
            let page = match next {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        seller = sellername,
                        page = pages_synced + 1,
                        total_pages,
                        listings = latest.inventory.len(),
                        error = %e,
                        "Inventory page fetch failed, keeping partial result"
                    );
                    break;
                }
            };

            merge.extend(&page.items);
            latest = self
                .cache
                .upsert(merge.snapshot(previous.filter(|_| !page.is_last())))
                .await?;
            pages_synced += 1;

            tracing::debug!(
                seller = sellername,
                page = page.page_number,
                total_pages,
                listings = latest.inventory.len(),
                "Persisted inventory page"
            );
        }

        tracing::info!(
            seller = sellername,
            pages = pages_synced,
            listings = latest.inventory.len(),
            "Inventory sync finished"
        );

        Ok(latest)
    }
}
