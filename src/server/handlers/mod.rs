pub mod appointments;
pub mod auth;
pub mod clients;
pub mod dashboard;

use serde::Deserialize;

use crate::pagination::{PageQuery, PaginationError};

/// Query string shared by the list views
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
}

impl ListParams {
    /// Build the page query; page size first, since changing it restarts at page 1
    pub fn to_query(&self, default_page_size: u32, filters: &[(&str, Option<&String>)]) -> Result<PageQuery, PaginationError> {
        let mut query = PageQuery::new(1, default_page_size);
        if let Some(size) = self.page_size {
            query.set_page_size(size)?;
        }
        for (key, value) in filters {
            if let Some(value) = value {
                query.set_filter(key, value.trim());
            }
        }
        query.set_page(self.page.unwrap_or(1));
        Ok(query)
    }
}
