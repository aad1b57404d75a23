#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use wiremock::MockServer;

use wellness_admin::api::HttpClient;
use wellness_admin::config::AppConfig;
use wellness_admin::navigation::HistoryNavigator;
use wellness_admin::server::{app, AppState};
use wellness_admin::session::SessionStore;

/// Stand-in for the clinic backend; every route lives under `/api`
pub async fn backend() -> MockServer {
    MockServer::start().await
}

pub fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::with_base_url(&format!("{}/api", server.uri()));
    config.server.enable_request_logging = false;
    config
}

/// Backend client bound to `session`, standing on `path`
pub fn http_client(server: &MockServer, session: SessionStore, path: &str) -> Result<(HttpClient, Arc<HistoryNavigator>)> {
    let navigator = Arc::new(HistoryNavigator::at(path));
    let http = HttpClient::new(&config_for(server), reqwest::Client::new(), session, navigator.clone())?;
    Ok((http, navigator))
}

pub fn console(server: &MockServer) -> Result<Router> {
    Ok(app(AppState::new(config_for(server))?))
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("access_token={}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

pub async fn body_json(response: Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn header_value(response: &Response, name: header::HeaderName) -> Option<String> {
    response.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

pub fn user_json() -> Value {
    json!({ "id": 1, "email": "admin@clinic.test", "name": "Clinic Admin", "role": "admin" })
}

pub fn client_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "externalId": format!("c-{:03}", id),
        "name": name,
        "email": format!("{}@example.test", name.to_lowercase().replace(' ', ".")),
        "phone": null,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z"
    })
}

pub fn appointment_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "clientId": 3,
        "scheduledAt": "2025-02-10T15:00:00.000Z",
        "status": status,
        "createdAt": "2025-01-20T09:00:00Z",
        "updatedAt": "2025-01-20T09:00:00Z",
        "client": { "id": 3, "name": "John Doe", "email": "john@example.test", "phone": null }
    })
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data, "traceId": "test-trace" })
}

pub fn list_envelope(data: Vec<Value>, page: u32, page_size: u32, total: u64) -> Value {
    json!({
        "success": true,
        "data": data,
        "meta": { "page": page, "pageSize": page_size, "total": total, "totalPages": total.div_ceil(page_size as u64) }
    })
}

pub fn error_body(message: &str, code: &str) -> Value {
    json!({ "success": false, "message": message, "code": code })
}
