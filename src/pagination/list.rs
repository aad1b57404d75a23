use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::cache::{QueryCache, QueryKey};
use super::numbers::{page_numbers, PageItem};
use super::query::{PageQuery, PaginationError};
use super::result::{PageMeta, PageResult};
use crate::error::ApiError;

/// A paginated, filterable collection behind one read endpoint
#[async_trait]
pub trait ListSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    /// Resource name; first element of every cache key for this source
    fn resource(&self) -> &'static str;

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Self::Item>, ApiError>;
}

/// What a list page renders: rows, pagination block and the page-number control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
    pub pages: Vec<PageItem>,
}

impl<T> From<PageResult<T>> for PageView<T> {
    fn from(result: PageResult<T>) -> Self {
        let pages = page_numbers(result.meta.page, result.meta.total_pages);
        Self {
            items: result.items,
            meta: result.meta,
            pages,
        }
    }
}

/// Page state plus cached loading for one list source
///
/// Both list pages (clients, appointments) are this controller over a
/// different `ListSource`.
pub struct ListController<S: ListSource> {
    source: S,
    query: PageQuery,
    cache: Arc<QueryCache<PageResult<S::Item>>>,
    scope: String,
}

impl<S: ListSource> ListController<S> {
    pub fn new(source: S, query: PageQuery, cache: Arc<QueryCache<PageResult<S::Item>>>) -> Self {
        Self {
            source,
            query,
            cache,
            scope: String::new(),
        }
    }

    /// Partition cache entries, e.g. by session
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), PaginationError> {
        self.query.set_page_size(page_size)
    }

    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) {
        self.query.set_filter(key, value);
    }

    fn key(&self) -> QueryKey {
        self.query.cache_key(self.source.resource()).scoped(self.scope.clone())
    }

    async fn fetch_current(&self) -> Result<PageResult<S::Item>, ApiError> {
        let source = &self.source;
        let query = &self.query;
        self.cache.get_or_fetch(self.key(), || source.fetch(query)).await
    }

    /// Load the current page
    ///
    /// When narrowing filters leave the requested page past the end, the page
    /// is pulled back to the last one and loaded again instead of showing an
    /// empty table.
    pub async fn load(&mut self) -> Result<PageView<S::Item>, ApiError> {
        let result = self.fetch_current().await?;
        let requested = self.query.page();
        if self.query.clamp_to(result.meta.total_pages) {
            tracing::debug!(
                resource = self.source.resource(),
                requested,
                last = self.query.page(),
                "requested page is past the end, loading the last page"
            );
            return Ok(self.fetch_current().await?.into());
        }
        Ok(result.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Forty numbered rows, filterable by parity
    struct Numbers {
        calls: Mutex<Vec<PageQuery>>,
    }

    #[async_trait]
    impl ListSource for Numbers {
        type Item = u32;

        fn resource(&self) -> &'static str {
            "numbers"
        }

        async fn fetch(&self, query: &PageQuery) -> Result<PageResult<u32>, ApiError> {
            self.calls.lock().unwrap().push(query.clone());
            let rows: Vec<u32> = (1..=40)
                .filter(|n| match query.filter("parity") {
                    Some("even") => n % 2 == 0,
                    Some("odd") => n % 2 == 1,
                    _ => true,
                })
                .collect();
            let size = query.page_size() as usize;
            let start = (query.page() as usize - 1) * size;
            let items = rows.iter().skip(start).take(size).copied().collect();
            Ok(PageResult::new(items, PageMeta::new(query.page(), query.page_size(), rows.len() as u64)))
        }
    }

    fn controller(query: PageQuery) -> ListController<Numbers> {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(30)));
        ListController::new(Numbers { calls: Mutex::new(Vec::new()) }, query, cache)
    }

    #[tokio::test]
    async fn loads_page_with_number_control() {
        let mut list = controller(PageQuery::new(2, 10));
        let view = list.load().await.unwrap();

        assert_eq!(view.items, (11..=20).collect::<Vec<u32>>());
        assert_eq!(view.meta.total_pages, 4);
        assert_eq!(view.pages, vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3), PageItem::Page(4)]);
    }

    #[tokio::test]
    async fn repeated_load_is_served_from_cache() {
        let mut list = controller(PageQuery::new(1, 10));
        list.load().await.unwrap();
        list.load().await.unwrap();
        assert_eq!(list.source.calls.lock().unwrap().len(), 1);

        list.set_page(2);
        list.load().await.unwrap();
        assert_eq!(list.source.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_page_is_pulled_back_to_the_last_page() {
        let mut list = controller(PageQuery::new(1, 25));
        list.set_page(2);
        // 40 rows at 25 per page -> 2 pages; page 3 does not exist
        list.set_page(3);
        let view = list.load().await.unwrap();

        assert_eq!(list.query().page(), 2);
        assert_eq!(view.meta.page, 2);
        assert_eq!(view.items, (26..=40).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn filter_change_restarts_from_first_page() {
        let mut list = controller(PageQuery::new(1, 10));
        list.set_page(3);
        list.set_filter("parity", "even");
        let view = list.load().await.unwrap();

        assert_eq!(list.query().page(), 1);
        assert_eq!(view.items, vec![2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
        assert_eq!(view.meta.total_pages, 2);
    }
}
