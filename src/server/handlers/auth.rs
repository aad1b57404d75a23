use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::api;
use crate::messages::{APP_NAME, SUCCESS_MESSAGES};
use crate::middleware::ApiResponse;
use crate::server::state::AppState;
use crate::server::view::{session_cookie_header, sign_out_redirect, ViewError};
use crate::validation::LoginForm;

/// GET /login
pub async fn login_page() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "title": APP_NAME,
        "heading": "Sign in to your account",
        "fields": ["email", "password"]
    }))
}

/// POST /login
pub async fn login_submit(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, ViewError> {
    let credentials = form.validate()?;

    // Anonymous context: the request carries no usable cookie on this route
    let ctx = state.context(&HeaderMap::new(), &state.config.session.login_path)?;
    let data = api::login(&ctx.http, &credentials).await?;
    tracing::info!(user = %data.user.email, "console sign-in");

    let session = &state.config.session;
    let cookie = session_cookie_header(&session.cookie_name, &data.access_token, session.cookie_max_age_secs);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        ApiResponse::success(json!({ "user": data.user })).with_message(SUCCESS_MESSAGES.signed_in),
    ))
}

/// POST /logout
pub async fn logout(State(state): State<AppState>) -> Response {
    tracing::info!("console sign-out");
    sign_out_redirect(&state.config.session.cookie_name, &state.config.session.login_path)
}
