// cli/config.rs - Session files and per-command backend access for the CLI
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{backend_client, HttpClient};
use crate::config::{config, AppConfig};
use crate::error::ApiError;
use crate::guard::{ClientGuard, GuardState};
use crate::middleware::{evaluate, GuardDecision};
use crate::navigation::HistoryNavigator;
use crate::pagination::QueryCache;
use crate::session::{CookieFile, LocalStorage, SessionPersistence, SessionStore};

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("WELLNESS_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("wellness").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Everything one command needs: the backend client bound to the stored session
/// and the route the command stands for
pub struct CliContext {
    pub config: AppConfig,
    pub http: HttpClient,
    pub cookie: CookieFile,
    navigator: Arc<HistoryNavigator>,
    route: String,
}

impl CliContext {
    /// Restore the stored session and bind a backend client to it
    pub async fn open(route: &str) -> anyhow::Result<Self> {
        Self::open_with(config().clone(), route).await
    }

    pub async fn open_with(config: AppConfig, route: &str) -> anyhow::Result<Self> {
        let dir = get_config_dir()?;
        let cookie = CookieFile::in_dir(&dir, config.session.cookie_name.clone(), config.session.cookie_max_age_secs);
        let adapters: Vec<Arc<dyn SessionPersistence>> =
            vec![Arc::new(LocalStorage::in_dir(&dir)), Arc::new(cookie.clone())];
        let session = SessionStore::new(adapters);
        session.restore().await;

        let navigator = Arc::new(HistoryNavigator::at(route));
        let http = HttpClient::new(&config, backend_client(&config)?, session, navigator.clone())?;

        Ok(Self {
            config,
            http,
            cookie,
            navigator,
            route: route.to_string(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        self.http.session()
    }

    /// Edge rule for this command's route, decided on the cookie alone
    pub async fn edge_decision(&self) -> GuardDecision {
        let has_cookie = self.cookie.value().await.is_some();
        evaluate(has_cookie, &self.route, &self.config.session.login_path, &self.config.session.home_path)
    }

    /// Both guards must pass: the cookie check, then the restored session
    pub async fn require_session(&self) -> anyhow::Result<()> {
        if let GuardDecision::Redirect(_) = self.edge_decision().await {
            anyhow::bail!("Not signed in. Run `wellness auth login <email>` first.");
        }
        let mut guard = ClientGuard::new(
            self.session().clone(),
            self.navigator.clone(),
            self.config.session.login_path.clone(),
        );
        if guard.mount().await != GuardState::Authenticated {
            anyhow::bail!("Session data is missing. Run `wellness auth login <email>` again.");
        }
        Ok(())
    }

    /// Error for a failed backend call; a rejected token reads as an expired session
    pub fn check<T>(&self, result: Result<T, ApiError>) -> anyhow::Result<T> {
        result.map_err(|error| {
            if self.navigator.redirected_to().as_deref() == Some(self.config.session.login_path.as_str()) {
                anyhow::anyhow!("Session expired. Run `wellness auth login <email>` again.")
            } else {
                anyhow::anyhow!("{}", error.notification())
            }
        })
    }

    /// Cache for a single command run; list loads go through it like in the console
    pub fn cache<T: Clone>(&self) -> Arc<QueryCache<T>> {
        Arc::new(QueryCache::new(Duration::from_secs(self.config.query.stale_time_secs)))
    }
}
