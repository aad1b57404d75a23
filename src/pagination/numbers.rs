use serde::{Serialize, Serializer};
use std::fmt;

/// Show every page up to this many; beyond it the sequence collapses
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// One slot of the pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(n) => serializer.serialize_u32(*n),
            PageItem::Ellipsis => serializer.serialize_str("…"),
        }
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("…"),
        }
    }
}

/// Compact page-number sequence for a pagination control
///
/// Up to five pages are listed in full. Otherwise the first and last page are
/// always present, the current page keeps one neighbour on each side, and a
/// gap of more than one page on either side becomes a single ellipsis.
pub fn page_numbers(current: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let current = current.clamp(1, total_pages);
    let mut items = vec![PageItem::Page(1)];

    if current > 3 {
        items.push(PageItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total_pages - 1);
    items.extend((start..=end).map(PageItem::Page));

    if current < total_pages - 2 {
        items.push(PageItem::Ellipsis);
    }

    items.push(PageItem::Page(total_pages));
    items
}
