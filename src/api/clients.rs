use async_trait::async_trait;

use super::envelope::ListEnvelope;
use super::http::HttpClient;
use crate::error::ApiError;
use crate::models::Client;
use crate::pagination::{ListSource, PageQuery, PageResult};

pub const RESOURCE: &str = "clients";

/// `GET /clients?page&pageSize[&q]`
pub async fn fetch_clients(http: &HttpClient, query: &PageQuery) -> Result<PageResult<Client>, ApiError> {
    let envelope: ListEnvelope<Client> = http.get("/clients", &query.to_query_pairs()).await?;
    Ok(envelope.into())
}

/// Client roster as a list source
pub struct ClientSource {
    http: HttpClient,
}

impl ClientSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ListSource for ClientSource {
    type Item = Client;

    fn resource(&self) -> &'static str {
        RESOURCE
    }

    async fn fetch(&self, query: &PageQuery) -> Result<PageResult<Client>, ApiError> {
        fetch_clients(&self.http, query).await
    }
}
