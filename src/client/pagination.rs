use futures_util::stream::{self, Stream, TryStreamExt};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::sync::Arc;

use super::transport::{Transport, UpstreamResponse};
use crate::error::{AppError, AppResult};
use crate::models::{Page, PaginatedResponse};

/// Follows `next` links of a paginated upstream resource.
///
/// Pages are fetched strictly one after another so that every request passes
/// the shared rate-limit gate in turn and callers can persist page by page.
#[derive(Clone)]
pub struct PageWalker {
    transport: Arc<dyn Transport>,
}

enum Cursor<T> {
    First(Page<T>),
    Next {
        url: String,
        visited: HashSet<String>,
    },
    Done,
}

impl<T> Cursor<T> {
    /// Where to go after `page`. Stops on the last page, when the upstream
    /// says the page count is reached, or when a link leads back to a page
    /// already fetched.
    fn after(page: &Page<T>, mut visited: HashSet<String>) -> Self {
        if page.is_last() {
            return Cursor::Done;
        }

        match &page.next_cursor {
            Some(next) if visited.insert(next.clone()) => Cursor::Next {
                url: next.clone(),
                visited,
            },
            Some(next) => {
                tracing::warn!(url = %next, "Pagination links loop back, stopping walk");
                Cursor::Done
            }
            None => Cursor::Done,
        }
    }
}

impl PageWalker {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the first page. `Ok(None)` means the upstream answered 404: the
    /// resource does not exist.
    pub async fn fetch_first_page<R: PaginatedResponse>(
        &self,
        url: &str,
    ) -> AppResult<Option<Page<R::Item>>> {
        let response = self.transport.get(url).await?;

        if response.status == StatusCode::NOT_FOUND {
            tracing::debug!(url, "Upstream resource not found");
            return Ok(None);
        }

        decode::<R>(response).map(Some)
    }

    /// Fetch a page by cursor. Any non-2xx answer, 404 included, is an error.
    pub async fn fetch_page<R: PaginatedResponse>(&self, url: &str) -> AppResult<Page<R::Item>> {
        let response = self.transport.get(url).await?;
        decode::<R>(response)
    }

    /// Lazily yield `first` and then every following page, in order.
    ///
    /// The stream ends after the last page or after the first error.
    pub fn pages<R: PaginatedResponse>(
        &self,
        first: Page<R::Item>,
    ) -> impl Stream<Item = AppResult<Page<R::Item>>> + Send + '_ {
        stream::try_unfold(Cursor::First(first), move |cursor| async move {
            match cursor {
                Cursor::First(page) => {
                    let next = Cursor::after(&page, HashSet::new());
                    Ok::<_, AppError>(Some((page, next)))
                }
                Cursor::Next { url, visited } => {
                    tracing::debug!(url = %url, "Fetching next page");
                    let page = self.fetch_page::<R>(&url).await?;
                    let next = Cursor::after(&page, visited);
                    Ok(Some((page, next)))
                }
                Cursor::Done => Ok(None),
            }
        })
    }

    /// All items behind `first`, concatenated in page order.
    pub async fn walk<R: PaginatedResponse>(&self, first: Page<R::Item>) -> AppResult<Vec<R::Item>> {
        self.pages::<R>(first)
            .try_fold(Vec::new(), |mut items, page| async move {
                items.extend(page.items);
                Ok(items)
            })
            .await
    }
}

fn decode<R: PaginatedResponse>(response: UpstreamResponse) -> AppResult<Page<R::Item>> {
    if !response.status.is_success() {
        return Err(AppError::Request(response.into_request_error()));
    }

    let envelope: R = serde_json::from_str(&response.body)?;
    Ok(envelope.into_page())
}
