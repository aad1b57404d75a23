pub mod appointments;
pub mod auth;
pub mod clients;
pub mod dashboard;

use crate::pagination::{PageQuery, PaginationError};

/// Page query from `--page` / `--page-size`; a page size change restarts at page 1
pub(crate) fn page_query(page: u32, page_size: Option<u32>, default_page_size: u32) -> Result<PageQuery, PaginationError> {
    let mut query = PageQuery::new(1, default_page_size);
    if let Some(size) = page_size {
        query.set_page_size(size)?;
    }
    query.set_page(page);
    Ok(query)
}
