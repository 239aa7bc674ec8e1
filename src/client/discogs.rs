use reqwest::Url;
use std::sync::Arc;

use super::pagination::PageWalker;
use super::transport::Transport;
use crate::error::{AppError, AppResult};
use crate::models::{InventoryResponse, Listing, Page, Want, WantlistResponse};

const PER_PAGE: &str = "100";

/// Typed access to the seller inventory and want-list endpoints.
#[derive(Clone)]
pub struct DiscogsClient {
    base_url: Url,
    walker: PageWalker,
}

impl DiscogsClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("invalid upstream url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "upstream url {} cannot be a base",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            walker: PageWalker::new(transport),
        })
    }

    pub fn walker(&self) -> &PageWalker {
        &self.walker
    }

    /// First inventory page, newest listings first.
    pub fn inventory_url(&self, sellername: &str) -> String {
        self.user_url(
            sellername,
            "inventory",
            &[
                ("sort", "listed"),
                ("sort_order", "desc"),
                ("per_page", PER_PAGE),
                ("page", "1"),
            ],
        )
    }

    pub fn wantlist_url(&self, username: &str) -> String {
        self.user_url(username, "wants", &[("per_page", PER_PAGE), ("page", "1")])
    }

    fn user_url(&self, name: &str, resource: &str, query: &[(&str, &str)]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["users", name, resource]);
        }
        url.query_pairs_mut().extend_pairs(query);
        url.to_string()
    }

    pub async fn inventory_first_page(&self, sellername: &str) -> AppResult<Option<Page<Listing>>> {
        self.walker
            .fetch_first_page::<InventoryResponse>(&self.inventory_url(sellername))
            .await
    }

    pub async fn wantlist_first_page(&self, username: &str) -> AppResult<Option<Page<Want>>> {
        self.walker
            .fetch_first_page::<WantlistResponse>(&self.wantlist_url(username))
            .await
    }

    /// Every want on a user's want-list, or `None` if the user is unknown.
    pub async fn wantlist(&self, username: &str) -> AppResult<Option<Vec<Want>>> {
        match self.wantlist_first_page(username).await? {
            Some(first) => self.walker.walk::<WantlistResponse>(first).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BASE_URL, ScriptedTransport, envelope, page_url, want};
    use chrono::Utc;

    fn client() -> DiscogsClient {
        DiscogsClient::new(BASE_URL, Arc::new(ScriptedTransport::new())).unwrap()
    }

    #[test]
    fn builds_inventory_and_wantlist_urls() {
        let client = client();
        assert_eq!(
            client.inventory_url("recordshop"),
            "https://api.test/users/recordshop/inventory?sort=listed&sort_order=desc&per_page=100&page=1"
        );
        assert_eq!(
            client.wantlist_url("digger"),
            "https://api.test/users/digger/wants?per_page=100&page=1"
        );
    }

    #[test]
    fn user_name_is_one_escaped_segment() {
        let url = client().wantlist_url("a/b c");
        assert_eq!(url, "https://api.test/users/a%2Fb%20c/wants?per_page=100&page=1");
    }

    #[test]
    fn base_path_is_kept() {
        let client =
            DiscogsClient::new("https://proxy.test/discogs/", Arc::new(ScriptedTransport::new()))
                .unwrap();
        assert_eq!(
            client.wantlist_url("digger"),
            "https://proxy.test/discogs/users/digger/wants?per_page=100&page=1"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let result = DiscogsClient::new("not a url", Arc::new(ScriptedTransport::new()));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn wantlist_follows_cursor_links() {
        let scripted = ScriptedTransport::new();
        let client = DiscogsClient::new(BASE_URL, Arc::new(scripted.clone())).unwrap();
        scripted.respond_json(
            &client.wantlist_url("digger"),
            envelope(
                "wants",
                vec![want(1, Utc::now())],
                1,
                2,
                Some(page_url("users/digger/wants", 2)),
            ),
        );
        scripted.respond_json(
            &page_url("users/digger/wants", 2),
            envelope("wants", vec![want(2, Utc::now())], 2, 2, None),
        );

        let wants = client.wantlist("digger").await.unwrap().unwrap();
        assert_eq!(wants.len(), 2);
        assert!(client.wantlist("nobody").await.unwrap().is_none());
    }
}
