use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::page::Page;

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub items: u32,
    pub page: u32,
    pub pages: u32,
    #[serde(default)]
    pub urls: PageUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageUrls {
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// An upstream response carrying one page of a paginated collection.
pub trait PaginatedResponse: serde::de::DeserializeOwned + Send + 'static {
    type Item: Send + 'static;

    fn into_page(self) -> Page<Self::Item>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub currency: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Release {
    pub id: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seller {
    pub username: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// A single marketplace listing from a seller's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub condition: String,
    #[serde(default)]
    pub sleeve_condition: String,
    pub posted: DateTime<Utc>,
    pub price: Price,
    pub release: Release,
    pub seller: Seller,
}

/// A release on a user's want-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Want {
    #[serde(rename = "id")]
    pub release_id: i64,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl PaginatedResponse for InventoryResponse {
    type Item = Listing;

    fn into_page(self) -> Page<Listing> {
        Page::from_pagination(self.listings, self.pagination)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WantlistResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub wants: Vec<Want>,
}

impl PaginatedResponse for WantlistResponse {
    type Item = Want;

    fn into_page(self) -> Page<Want> {
        Page::from_pagination(self.wants, self.pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{envelope, listing, want};

    #[test]
    fn inventory_envelope_decodes_into_page() {
        let body = envelope(
            "listings",
            vec![listing(1, 100), listing(2, 200)],
            1,
            2,
            Some("https://api.test/next".to_string()),
        );

        let response: InventoryResponse = serde_json::from_value(body).unwrap();
        let page = response.into_page();

        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.next_cursor.as_deref(), Some("https://api.test/next"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].release.id, 200);
        assert_eq!(page.items[0].price.currency, "GBP");
    }

    #[test]
    fn want_id_is_the_release_id() {
        let body = envelope("wants", vec![want(201, Utc::now())], 1, 1, None);

        let page = serde_json::from_value::<WantlistResponse>(body)
            .unwrap()
            .into_page();

        assert_eq!(page.items[0].release_id, 201);
        assert!(page.is_last());
    }
}
