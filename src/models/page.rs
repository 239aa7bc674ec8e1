use super::discogs::Pagination;

/// One page of an upstream collection.
///
/// `next_cursor` is the server-provided URL of the following page, requested
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn from_pagination(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            page_number: pagination.page.max(1),
            total_pages: pagination.pages,
            next_cursor: pagination.urls.next.filter(|next| !next.trim().is_empty()),
        }
    }

    /// No link onwards, or the upstream's page count is reached.
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none() || (self.total_pages > 0 && self.page_number >= self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_number: u32, total_pages: u32, next: Option<&str>) -> Page<()> {
        Page {
            items: Vec::new(),
            page_number,
            total_pages,
            next_cursor: next.map(str::to_string),
        }
    }

    #[test]
    fn last_page_by_link_or_by_count() {
        assert!(page(1, 3, None).is_last());
        assert!(!page(1, 3, Some("https://api.test/p2")).is_last());
        assert!(page(3, 3, Some("https://api.test/p4")).is_last());
        // an unknown page count leaves the link in charge
        assert!(!page(4, 0, Some("https://api.test/p5")).is_last());
    }
}
