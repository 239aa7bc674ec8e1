use futures_util::future::try_join_all;
use serde::Serialize;
use std::collections::HashSet;

use super::inventory::InventoryService;
use super::wantlist::WantlistService;
use crate::error::{AppError, AppResult};
use crate::models::{FilteredInventory, SellerListing};
use crate::utils::is_blank;

/// Outcome of matching one seller's inventory against a want-list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "inventory", rename_all = "snake_case")]
pub enum InWantlist {
    Found(FilteredInventory),
    WantlistNotFound,
    WantlistEmpty,
    SellerNotFound,
}

/// Cross-references want-lists with seller inventories.
#[derive(Clone)]
pub struct StockService {
    inventories: InventoryService,
    wantlists: WantlistService,
}

impl StockService {
    pub fn new(inventories: InventoryService, wantlists: WantlistService) -> Self {
        Self {
            inventories,
            wantlists,
        }
    }

    /// A seller's listings restricted to releases on `username`'s want-list.
    pub async fn in_wantlist(&self, sellername: &str, username: &str) -> AppResult<InWantlist> {
        if is_blank(sellername) {
            return Err(AppError::validation("sellername"));
        }

        let wantlist = self.wantlists.get(username).await?;
        if !wantlist.exists {
            return Ok(InWantlist::WantlistNotFound);
        }
        if wantlist.release_ids.is_empty() {
            return Ok(InWantlist::WantlistEmpty);
        }

        let inventory = self.inventories.get(sellername).await?;
        if !inventory.exists {
            return Ok(InWantlist::SellerNotFound);
        }

        Ok(InWantlist::Found(FilteredInventory::new(
            &inventory,
            &wantlist.release_ids,
        )))
    }

    /// Listings from any of `sellernames` whose release is on the want-list,
    /// grouped by seller in the order given.
    pub async fn wantlist_items_in_stock(
        &self,
        username: &str,
        sellernames: &[String],
    ) -> AppResult<Vec<SellerListing>> {
        if sellernames.is_empty() {
            return Err(AppError::validation("sellernames"));
        }

        let wantlist = self.wantlists.get(username).await?;
        if wantlist.release_ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: HashSet<i64> = wantlist.release_ids.iter().copied().collect();

        // distinct sellers sync concurrently; pages within one stay sequential
        let inventories = try_join_all(
            sellernames
                .iter()
                .map(|sellername| self.inventories.get(sellername)),
        )
        .await?;

        Ok(inventories
            .into_iter()
            .flat_map(|inventory| inventory.inventory)
            .filter(|listing| wanted.contains(&listing.release_id))
            .collect())
    }
}
