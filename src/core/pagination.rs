use crate::core::endpoint::with_query;
use crate::domain::model::Page;
use std::collections::BTreeMap;

pub const DEFAULT_PAGE_SIZE: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u64, current: bool },
    Gap,
}

/// Per-page list state: where we are, how far we can go, and which
/// filters produced the current listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    page_size: u64,
    current_page: u64,
    total_pages: u64,
    total_count: u64,
    has_next: bool,
    has_previous: bool,
    filters: BTreeMap<String, String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            total_pages: 1,
            total_count: 0,
            has_next: false,
            has_previous: false,
            filters: BTreeMap::new(),
        }
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Replaces the active filters and goes back to the first page.
    pub fn set_filters<I, K, V>(&mut self, filters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.filters = filters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        self.current_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(std::iter::empty::<(String, String)>());
    }

    /// `resource?page=N&page_size=M&filter=value...` for the given page.
    /// The page size travels with the request so the server pages the
    /// listing the same way `apply` counts it.
    pub fn query_path(&self, resource: &str, page: u64) -> String {
        let page = page.max(1).to_string();
        let page_size = self.page_size.to_string();
        let pairs = [("page", page.as_str()), ("page_size", page_size.as_str())]
            .into_iter()
            .chain(
                self.filters
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        with_query(resource, pairs)
    }

    /// Records the envelope returned for `page`. The current page is kept
    /// within `1..=total_pages`.
    pub fn apply<T>(&mut self, page: u64, envelope: &Page<T>) {
        self.total_count = envelope.count;
        self.total_pages = envelope.count.div_ceil(self.page_size).max(1);
        self.current_page = page.clamp(1, self.total_pages);
        self.has_next = envelope.next.is_some();
        self.has_previous = envelope.previous.is_some();
    }

    /// Resets to an empty listing, as after a failed load.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.total_pages = 1;
        self.total_count = 0;
        self.has_next = false;
        self.has_previous = false;
    }

    pub fn next_page(&self) -> Option<u64> {
        (self.current_page < self.total_pages).then_some(self.current_page + 1)
    }

    pub fn previous_page(&self) -> Option<u64> {
        (self.current_page > 1).then_some(self.current_page - 1)
    }

    /// Numbered pager around the current page, `window` pages on each side.
    pub fn page_links(&self, window: u64) -> Vec<PageLink> {
        let total = self.total_pages.max(1);
        let current = self.current_page.clamp(1, total);

        let mut start = current.saturating_sub(window).max(1);
        let mut end = (current + window).min(total);

        if current - start < window {
            end = (end + (window - (current - start))).min(total);
        }
        if end - current < window {
            start = start.saturating_sub(window - (end - current)).max(1);
        }

        let mut links = Vec::new();
        if start > 1 {
            links.push(PageLink::Page {
                number: 1,
                current: false,
            });
            if start > 2 {
                links.push(PageLink::Gap);
            }
        }
        for number in start..=end {
            links.push(PageLink::Page {
                number,
                current: number == current,
            });
        }
        if end < total {
            if end + 1 < total {
                links.push(PageLink::Gap);
            }
            links.push(PageLink::Page {
                number: total,
                current: false,
            });
        }
        links
    }

    pub fn summary(&self) -> String {
        format!(
            "Page {} / {} ({} total)",
            self.current_page, self.total_pages, self.total_count
        )
    }
}
