use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri},
};

use super::ListParams;
use crate::api::ClientSource;
use crate::middleware::ApiResponse;
use crate::models::Client;
use crate::pagination::{ListController, PageView};
use crate::server::state::AppState;
use crate::server::view::ViewError;

/// GET /clients?page&pageSize&q
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Result<ApiResponse<PageView<Client>>, ViewError> {
    let query = params.to_query(state.config.query.default_page_size, &[("q", params.q.as_ref())])?;
    let ctx = state.context(&headers, uri.path())?;

    let mut list = ListController::new(ClientSource::new(ctx.http.clone()), query, state.caches.clients.clone())
        .with_scope(ctx.token.clone());
    let view = ctx.check(list.load().await)?;
    Ok(ApiResponse::success(view))
}
