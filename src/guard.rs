// Client guard: gate a protected page on the restored session
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::navigation::Navigator;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardState {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Per-mount guard around a protected view
///
/// Starts in `Loading` and settles exactly once, when the session store
/// reports that restore has completed. No polling: the guard waits on the
/// store's watch channel.
pub struct ClientGuard {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    state: GuardState,
}

impl ClientGuard {
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        Self {
            session,
            navigator,
            login_path: login_path.into(),
            state: GuardState::Loading,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub async fn mount(&mut self) -> GuardState {
        if self.state != GuardState::Loading {
            return self.state;
        }

        let mut rx = self.session.subscribe();
        let authenticated = rx
            .wait_for(|snapshot| snapshot.restored)
            .await
            .map(|snapshot| snapshot.session.is_authenticated())
            .unwrap_or(false);

        self.state = if authenticated {
            GuardState::Authenticated
        } else {
            tracing::debug!(from = %self.navigator.current_path(), "no session, sending to login");
            self.navigator.navigate(&self.login_path);
            GuardState::Unauthenticated
        };
        self.state
    }

    /// Run `body` only for an authenticated session
    pub async fn protect<F, Fut, T>(&mut self, body: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.mount().await {
            GuardState::Authenticated => Some(body().await),
            GuardState::Loading | GuardState::Unauthenticated => None,
        }
    }
}
