//! Page-number pagination for feeds.

use serde::{Deserialize, Serialize};

/// Posts shown per feed page.
pub const PAGE_SIZE: u64 = 10;

/// Splits `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub count: u64,
    pub per_page: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty list still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `?page=` value to a valid page number.
    ///
    /// Missing or non-numeric values give the first page, numbers outside
    /// `1..=num_pages` give the last page.
    pub fn resolve(&self, raw: Option<&str>) -> u64 {
        let last = self.num_pages();
        match raw.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 => last,
            Some(Ok(n)) => (n as u64).min(last),
        }
    }

    /// Offset of the first item on `number`.
    pub fn offset(&self, number: u64) -> u64 {
        (number.saturating_sub(1)) * self.per_page
    }
}

/// One page of a feed plus the metadata needed to render page links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
}

impl<T> FeedPage<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
