use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cache::QueryKey;

/// Page sizes offered by the page-size control
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page size {0} is not offered (choose 10, 25, 50 or 100)")]
    UnsupportedPageSize(u32),
}

/// Page, page size and filters of one list request
///
/// Changing the page size or any filter always starts again from page 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    page: u32,
    page_size: u32,
    #[serde(default)]
    filters: BTreeMap<String, String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: BTreeMap::new(),
        }
    }
}

impl PageQuery {
    /// Any positive page size is accepted here; the UI options are enforced by `set_page_size`
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            filters: BTreeMap::new(),
        }
    }

    /// Builder form of `set_filter` for constructing a query up front
    pub fn with_filter(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.filters.insert(key.to_string(), value);
        }
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), PaginationError> {
        if !PAGE_SIZE_OPTIONS.contains(&page_size) {
            return Err(PaginationError::UnsupportedPageSize(page_size));
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    /// Set or, with an empty value, remove a filter. Page resets to 1 when the filter changes.
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let changed = if value.is_empty() {
            self.filters.remove(key).is_some()
        } else {
            self.filters.insert(key.to_string(), value.clone()).as_deref() != Some(value.as_str())
        };
        if changed {
            self.page = 1;
        }
    }

    /// Pull the page back inside `1..=total_pages`; returns whether it moved
    pub fn clamp_to(&mut self, total_pages: u32) -> bool {
        if total_pages > 0 && self.page > total_pages {
            self.page = total_pages;
            true
        } else {
            false
        }
    }

    /// Query-string pairs: `page`, `pageSize`, then every non-empty filter
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// Cache key covering the full parameter tuple
    pub fn cache_key(&self, resource: &str) -> QueryKey {
        let mut parts = vec![
            resource.to_string(),
            self.page.to_string(),
            self.page_size.to_string(),
        ];
        parts.extend(self.filters.iter().map(|(k, v)| format!("{}={}", k, v)));
        QueryKey::new(parts)
    }
}
