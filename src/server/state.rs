use axum::http::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{self, backend_client, HttpClient};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::middleware::session_cookie;
use crate::models::{Appointment, Client, Dashboard};
use crate::navigation::HistoryNavigator;
use crate::pagination::{PageResult, QueryCache};
use crate::session::SessionStore;

use super::view::ViewError;

/// Read caches shared by every console request, partitioned per session token
pub struct Caches {
    pub clients: Arc<QueryCache<PageResult<Client>>>,
    pub appointments: Arc<QueryCache<PageResult<Appointment>>>,
    pub dashboard: QueryCache<Dashboard>,
}

impl Caches {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            clients: Arc::new(QueryCache::new(stale_time)),
            appointments: Arc::new(QueryCache::new(stale_time)),
            dashboard: QueryCache::new(stale_time),
        }
    }

    /// Creating, updating or cancelling an appointment changes both lists and dashboard counts
    pub fn appointment_changed(&self) {
        self.appointments.invalidate(api::appointments::RESOURCE);
        self.dashboard.invalidate(api::dashboard::RESOURCE);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: reqwest::Client,
    pub caches: Arc<Caches>,
}

impl AppState {
    pub fn new(config: AppConfig) -> reqwest::Result<Self> {
        let backend = backend_client(&config)?;
        let caches = Caches::new(Duration::from_secs(config.query.stale_time_secs));
        Ok(Self {
            config: Arc::new(config),
            backend,
            caches: Arc::new(caches),
        })
    }

    /// Backend access for one console request, acting with the caller's cookie token
    pub fn context(&self, headers: &HeaderMap, path: &str) -> Result<RequestContext, ViewError> {
        let token = session_cookie(headers, &self.config.session.cookie_name).unwrap_or_default();
        let session = if token.is_empty() {
            SessionStore::in_memory()
        } else {
            SessionStore::from_token(token.clone())
        };
        let navigator = Arc::new(HistoryNavigator::at(path));
        let http = HttpClient::new(&self.config, self.backend.clone(), session, navigator.clone())
            .map_err(|e| ViewError::Api(ApiError::new(None, format!("invalid backend URL: {}", e), Some("CONFIG_ERROR"))))?;

        Ok(RequestContext {
            http,
            navigator,
            token,
            cookie_name: self.config.session.cookie_name.clone(),
            login_path: self.config.session.login_path.clone(),
        })
    }
}

pub struct RequestContext {
    pub http: HttpClient,
    pub navigator: Arc<HistoryNavigator>,
    /// Cache scope; empty when the request carried no cookie
    pub token: String,
    cookie_name: String,
    login_path: String,
}

impl RequestContext {
    /// Turn a failed backend call into a view error
    ///
    /// When the HTTP client tore the session down (401 outside the login flow)
    /// the caller is signed out of the console as well.
    pub fn check<T>(&self, result: Result<T, ApiError>) -> Result<T, ViewError> {
        result.map_err(|error| {
            if self.navigator.redirected_to().as_deref() == Some(self.login_path.as_str()) {
                tracing::info!("backend rejected the session cookie, signing out of the console");
                ViewError::SignedOut {
                    cookie_name: self.cookie_name.clone(),
                    login_path: self.login_path.clone(),
                }
            } else {
                ViewError::Api(error)
            }
        })
    }
}
