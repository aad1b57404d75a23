use super::envelope::Envelope;
use super::http::HttpClient;
use crate::error::ApiError;
use crate::models::Dashboard;

pub const RESOURCE: &str = "dashboard";

pub async fn fetch_dashboard(http: &HttpClient) -> Result<Dashboard, ApiError> {
    let envelope: Envelope<Dashboard> = http.get("/dashboard", &[]).await?;
    Ok(envelope.data)
}
