// api/http.rs - Backend HTTP client: bearer auth, error normalization, 401 teardown
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::{normalize_base_url, AppConfig};
use crate::error::ApiError;
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Path fragment identifying the login call; a 401 there is a wrong password, not an expired session
const LOGIN_ENDPOINT: &str = "/auth/login";

/// Shared reqwest client with the configured timeout
pub fn backend_client(config: &AppConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
}

/// Every backend call goes through here
///
/// Requests carry `Accept: application/json` and, when the session holds a
/// token, `Authorization: Bearer <token>`. Failures come back as `ApiError`.
/// A 401 outside the login flow signs the session out and sends the navigator
/// to the login page before the error is returned.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl HttpClient {
    pub fn new(
        config: &AppConfig,
        client: reqwest::Client,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, url::ParseError> {
        let base_url = normalize_base_url(&config.api.base_url);
        Url::parse(&base_url)?;

        Ok(Self {
            client,
            base_url,
            session,
            navigator,
            login_path: config.session.login_path.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T, ApiError> {
        self.send(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, &[], Some(to_body(body)?)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, &[], Some(to_body(body)?)).await
    }

    /// PATCH with no request body, for action endpoints like cancel
    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::PATCH, path, &[], None).await
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::new(None, format!("invalid request URL for {}: {}", path, e), Some("INVALID_URL")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        tracing::debug!(%method, %url, "backend request");

        let mut request = self.client.request(method.clone(), url).header(ACCEPT, "application/json");
        if let Some(token) = self.session.token().filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.failed(&method, path, ApiError::from_transport(&e)).await),
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.failed(&method, path, ApiError::from_transport(&e)).await),
        };

        if !(200..300).contains(&status) {
            return Err(self.failed(&method, path, ApiError::from_response(status, &text)).await);
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(%method, path, status, "backend response did not match the expected shape: {}", e);
            ApiError::invalid_response(status, &e)
        })
    }

    async fn failed(&self, method: &Method, path: &str, error: ApiError) -> ApiError {
        tracing::debug!(%method, path, status = ?error.status, "backend request failed: {}", error.message);

        if error.is_unauthorized() && self.should_sign_out(path) {
            tracing::warn!(path, "backend rejected the session token, signing out");
            self.session.logout().await;
            self.navigator.navigate(&self.login_path);
        }
        error
    }

    fn should_sign_out(&self, path: &str) -> bool {
        !path.contains(LOGIN_ENDPOINT) && self.navigator.current_path() != self.login_path
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::bad_request(format!("request body could not be encoded: {}", e)))
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}
