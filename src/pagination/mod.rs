// pagination/mod.rs - List query pattern: page state, cached reads, page-number control
pub mod cache;
pub mod list;
pub mod numbers;
pub mod query;
pub mod result;

pub use cache::{QueryCache, QueryKey};
pub use list::{ListController, ListSource, PageView};
pub use numbers::{page_numbers, PageItem};
pub use query::{PageQuery, PaginationError, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
pub use result::{PageMeta, PageResult};
