// Normalized API error shared by the HTTP client, the console and the CLI
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::messages::ERROR_MESSAGES;

/// Error shape every failed backend call is normalized to: `{status, message, code, details}`
///
/// `status` is `None` when the request never produced a response (DNS, refused
/// connection, timeout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Backend error body: `{message, code, details}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<Value>,
}

impl ApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.map(str::to_string),
            details: None,
        }
    }

    /// Normalize a non-2xx backend response
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));

        Self {
            status: Some(status),
            message,
            code: parsed.code,
            details: parsed.details,
        }
    }

    /// Normalize a transport failure (no response, or a body we could not read)
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: if message.is_empty() { "Request failed".to_string() } else { message },
            code: None,
            details: None,
        }
    }

    /// A 2xx response whose body did not match the expected envelope
    pub fn invalid_response(status: u16, err: &serde_json::Error) -> Self {
        Self {
            status: Some(status),
            message: format!("Unexpected response from server: {}", err),
            code: Some("INVALID_RESPONSE".to_string()),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Some(400), message, Some("BAD_REQUEST"))
    }

    pub fn unprocessable_entity(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        Self {
            status: Some(422),
            message: message.into(),
            code: Some("VALIDATION_ERROR".to_string()),
            details: Some(json!({ "fields": field_errors })),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// Status to answer with; transport failures and undecodable successes map to 502
    pub fn status_code(&self) -> u16 {
        match self.status {
            Some(status) if status >= 400 => status,
            _ => 502,
        }
    }

    /// Error code for client handling, derived from the status when the backend sent none
    pub fn error_code(&self) -> &str {
        if let Some(code) = self.code.as_deref() {
            return code;
        }
        match self.status {
            None => "NETWORK_ERROR",
            Some(400) => "BAD_REQUEST",
            Some(401) => "UNAUTHORIZED",
            Some(403) => "FORBIDDEN",
            Some(404) => "NOT_FOUND",
            Some(409) => "CONFLICT",
            Some(422) => "UNPROCESSABLE_ENTITY",
            Some(s) if s >= 500 => "SERVER_ERROR",
            Some(_) => "REQUEST_FAILED",
        }
    }

    /// Message suitable for a transient user notification
    ///
    /// Transport failures collapse to one generic network message; the raw
    /// transport text stays in `message` for logs.
    pub fn notification(&self) -> &str {
        if self.status.is_none() {
            ERROR_MESSAGES.network_generic
        } else if self.message.trim().is_empty() {
            ERROR_MESSAGES.unknown
        } else {
            &self.message
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.notification(),
            "code": self.error_code(),
        });
        if let Some(details) = &self.details {
            body["details"] = details.clone();
        }
        body
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        (status, Json(self.to_json())).into_response()
    }
}
