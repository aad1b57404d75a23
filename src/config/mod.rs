use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Base URL used when `API_BASE_URL` is not set
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub query: QueryConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_max_age_secs: u64,
    pub login_path: String,
    pub home_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub stale_time_secs: u64,
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("API_BASE_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = normalize_base_url(&v);
            }
        }
        if let Ok(v) = env::var("API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }

        if let Ok(v) = env::var("SESSION_COOKIE_MAX_AGE_SECS") {
            self.session.cookie_max_age_secs = v.parse().unwrap_or(self.session.cookie_max_age_secs);
        }

        if let Ok(v) = env::var("QUERY_STALE_TIME_SECS") {
            self.query.stale_time_secs = v.parse().unwrap_or(self.query.stale_time_secs);
        }

        // WELLNESS_PORT wins over the generic PORT used by most hosts
        if let Some(port) = env::var("WELLNESS_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: 30,
            },
            session: SessionConfig::default(),
            query: QueryConfig {
                stale_time_secs: 30,
                default_page_size: 10,
            },
            server: ServerConfig {
                port: 3000,
                enable_request_logging: true,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_secs: 10,
            },
            session: SessionConfig::default(),
            query: QueryConfig {
                stale_time_secs: 30,
                default_page_size: 10,
            },
            server: ServerConfig {
                port: 3000,
                enable_request_logging: false,
            },
        }
    }

    /// Development defaults pointed at a specific backend, used by tests and embedders
    pub fn with_base_url(base_url: &str) -> Self {
        let mut config = Self::development();
        config.api.base_url = normalize_base_url(base_url);
        config
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "access_token".to_string(),
            cookie_max_age_secs: 60 * 60 * 24 * 7, // 7 days
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

/// Strip a single trailing slash so endpoint paths can be appended verbatim
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
