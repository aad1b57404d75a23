use serde::{Deserialize, Serialize};

/// Pagination block of a list envelope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Recompute `total_pages` from `total` and `page_size`, whatever the backend sent
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.page_size, self.total)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// `ceil(total / page_size)`; a zero page size yields zero pages
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of a list plus its pagination block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta: meta.normalized() }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(101, 25), 5);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn backend_total_pages_is_recomputed() {
        let meta = PageMeta { page: 2, page_size: 5, total: 12, total_pages: 99 }.normalized();
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next());
        assert!(meta.has_prev());
    }
}
