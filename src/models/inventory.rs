use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::discogs::Listing;
use crate::database::{Entity, EntityMeta};

/// A listing as stored locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerListing {
    pub id: i64,
    pub description: String,
    pub condition: String,
    pub sleeve_condition: String,
    pub posted: DateTime<Utc>,
    /// `"<currency> <value>"`, e.g. `"GBP 12.5"`.
    pub price: String,
    pub release_id: i64,
}

impl From<&Listing> for SellerListing {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            description: listing.release.description.clone(),
            condition: listing.condition.clone(),
            sleeve_condition: listing.sleeve_condition.clone(),
            posted: listing.posted,
            price: format!("{} {}", listing.price.currency, listing.price.value),
            release_id: listing.release.id,
        }
    }
}

/// A seller's inventory snapshot.
///
/// `exists == false` marks a seller the upstream reported as unknown; such an
/// entry always has an empty inventory and is cached like any other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerInventory {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub username: String,
    pub avatar_url: String,
    pub exists: bool,
    pub inventory: Vec<SellerListing>,
    pub last_updated: DateTime<Utc>,
}

impl SellerInventory {
    pub fn new(username: &str, avatar_url: String, inventory: Vec<SellerListing>) -> Self {
        Self {
            meta: EntityMeta::default(),
            username: username.to_string(),
            avatar_url,
            exists: true,
            inventory,
            last_updated: Utc::now(),
        }
    }

    pub fn not_found(username: &str) -> Self {
        Self {
            exists: false,
            ..Self::new(username, String::new(), Vec::new())
        }
    }
}

impl Entity for SellerInventory {
    fn key(&self) -> &str {
        &self.username
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }
}

/// A seller's inventory restricted to the releases on one want-list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilteredInventory {
    pub sellername: String,
    pub avatar_url: String,
    pub filtered_inventory: Vec<SellerListing>,
    pub inventory_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl FilteredInventory {
    pub fn new(inventory: &SellerInventory, release_ids: &[i64]) -> Self {
        let filtered_inventory = inventory
            .inventory
            .iter()
            .filter(|listing| release_ids.contains(&listing.release_id))
            .cloned()
            .collect();

        Self {
            sellername: inventory.username.clone(),
            avatar_url: inventory.avatar_url.clone(),
            filtered_inventory,
            inventory_count: inventory.inventory.len(),
            last_updated: inventory.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::listing;

    fn stored(id: i64, release_id: i64) -> SellerListing {
        let listing: Listing = serde_json::from_value(listing(id, release_id)).unwrap();
        SellerListing::from(&listing)
    }

    #[test]
    fn listing_maps_release_and_price() {
        let mapped = stored(7, 700);
        assert_eq!(mapped.id, 7);
        assert_eq!(mapped.release_id, 700);
        assert_eq!(mapped.description, "Release 700");
        assert_eq!(mapped.price, "GBP 12.5");
        assert_eq!(mapped.sleeve_condition, "Very Good (VG)");
    }

    #[test]
    fn filtered_inventory_keeps_wanted_releases_only() {
        let inventory = SellerInventory::new(
            "recordshop",
            "https://img.test/a.png".to_string(),
            vec![stored(1, 10), stored(2, 20), stored(3, 30)],
        );

        let filtered = FilteredInventory::new(&inventory, &[30, 10, 99]);

        assert_eq!(filtered.inventory_count, 3);
        let ids: Vec<i64> = filtered.filtered_inventory.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(filtered.sellername, "recordshop");
    }

    #[test]
    fn not_found_marker_is_empty() {
        let marker = SellerInventory::not_found("ghost");
        assert!(!marker.exists);
        assert!(marker.inventory.is_empty());
        assert_eq!(marker.key(), "ghost");
    }
}
