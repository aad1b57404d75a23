use axum::{
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};

use crate::error::ApiError;
use crate::pagination::PaginationError;
use crate::validation::ValidationError;

/// `Set-Cookie` value storing the session token
pub fn session_cookie_header(name: &str, token: &str, max_age_secs: u64) -> String {
    format!("{}={}; Path=/; Max-Age={}", name, token, max_age_secs)
}

/// `Set-Cookie` value expiring the session cookie
pub fn clear_cookie_header(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0", name)
}

/// Clear the session cookie and send the browser to the login page
pub fn sign_out_redirect(cookie_name: &str, login_path: &str) -> Response {
    (
        AppendHeaders([(SET_COOKIE, clear_cookie_header(cookie_name))]),
        Redirect::to(login_path),
    )
        .into_response()
}

#[derive(Debug)]
pub enum ViewError {
    /// Backend rejected the session token
    SignedOut { cookie_name: String, login_path: String },
    Api(ApiError),
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        ViewError::Api(err)
    }
}

impl From<ValidationError> for ViewError {
    fn from(err: ValidationError) -> Self {
        ViewError::Api(err.into())
    }
}

impl From<PaginationError> for ViewError {
    fn from(err: PaginationError) -> Self {
        ViewError::Api(ApiError::bad_request(err.to_string()))
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        match self {
            ViewError::SignedOut { cookie_name, login_path } => sign_out_redirect(&cookie_name, &login_path),
            ViewError::Api(err) => err.into_response(),
        }
    }
}
