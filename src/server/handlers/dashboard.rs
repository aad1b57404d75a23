use axum::{
    extract::State,
    http::{HeaderMap, Uri},
};

use crate::api::{self, fetch_dashboard};
use crate::middleware::ApiResponse;
use crate::models::Dashboard;
use crate::pagination::QueryKey;
use crate::server::state::AppState;
use crate::server::view::ViewError;

/// GET /
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<ApiResponse<Dashboard>, ViewError> {
    let ctx = state.context(&headers, uri.path())?;
    let key = QueryKey::new(vec![api::dashboard::RESOURCE.to_string()]).scoped(ctx.token.clone());

    let http = &ctx.http;
    let dashboard = state.caches.dashboard.get_or_fetch(key, || fetch_dashboard(http)).await;
    Ok(ApiResponse::success(ctx.check(dashboard)?))
}
