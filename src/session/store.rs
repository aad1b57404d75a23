use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;

use super::persistence::{PersistedSession, SessionPersistence, StorageError};
use crate::models::User;

/// Token and profile of the signed-in staff member
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// What subscribers observe: the session plus whether startup restore has finished
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub restored: bool,
}

/// Single owner of the session; clones share the same state
///
/// Reads never touch persistence. `restore`, `login` and `logout` are the only
/// paths that call the adapters, and adapter failures are logged and swallowed
/// so the in-memory state stays authoritative.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<SessionSnapshot>,
    adapters: Vec<Arc<dyn SessionPersistence>>,
}

impl SessionStore {
    pub fn new(adapters: Vec<Arc<dyn SessionPersistence>>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner { state, adapters }),
        }
    }

    /// Store without persistence; still needs `restore()` to leave the loading state
    pub fn in_memory() -> Self {
        Self::new(Vec::new())
    }

    /// Already-restored, non-persistent store carrying a bare token (console requests)
    pub fn from_token(token: impl Into<String>) -> Self {
        let store = Self::in_memory();
        let token = token.into();
        store.inner.state.send_modify(|s| {
            s.session.token = Some(token);
            s.restored = true;
        });
        store
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn session(&self) -> Session {
        self.inner.state.borrow().session.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().session.token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().session.user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().session.is_authenticated()
    }

    pub fn is_restored(&self) -> bool {
        self.inner.state.borrow().restored
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    /// Load the persisted session once at startup
    ///
    /// Adapters are asked in order; the first one holding a session wins. A
    /// corrupt entry is cleared from its adapter and skipped.
    pub async fn restore(&self) {
        if self.is_restored() {
            return;
        }

        let mut found = None;
        for adapter in &self.inner.adapters {
            match adapter.load().await {
                Ok(Some(persisted)) => {
                    found = Some(persisted);
                    break;
                }
                Ok(None) => {}
                Err(StorageError::Corrupt(reason)) => {
                    tracing::warn!(adapter = adapter.name(), "discarding stored session: {}", reason);
                    if let Err(e) = adapter.clear().await {
                        tracing::warn!(adapter = adapter.name(), "failed to clear stored session: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!(adapter = adapter.name(), "session storage not available: {}", e);
                }
            }
        }

        if let Some(persisted) = &found {
            tracing::debug!(user = %persisted.user.email, "restored session");
        }

        self.inner.state.send_modify(|s| {
            if let Some(persisted) = found {
                s.session = Session {
                    token: Some(persisted.token),
                    user: Some(persisted.user),
                };
            }
            s.restored = true;
        });
    }

    pub async fn login(&self, token: impl Into<String>, user: User) {
        let persisted = PersistedSession { token: token.into(), user };

        self.inner.state.send_modify(|s| {
            s.session = Session {
                token: Some(persisted.token.clone()),
                user: Some(persisted.user.clone()),
            };
            s.restored = true;
        });
        tracing::info!(user = %persisted.user.email, "signed in");

        let persisted = &persisted;
        let results = join_all(
            self.inner
                .adapters
                .iter()
                .map(|adapter| async move { (adapter.name(), adapter.save(persisted).await) }),
        )
        .await;
        for (name, result) in results {
            if let Err(e) = result {
                tracing::warn!(adapter = name, "failed to persist session: {}", e);
            }
        }
    }

    pub async fn logout(&self) {
        self.inner.state.send_modify(|s| {
            s.session = Session::default();
            s.restored = true;
        });
        tracing::info!("signed out");

        let results = join_all(
            self.inner
                .adapters
                .iter()
                .map(|adapter| async move { (adapter.name(), adapter.clear().await) }),
        )
        .await;
        for (name, result) in results {
            if let Err(e) = result {
                tracing::warn!(adapter = name, "failed to clear persisted session: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("SessionStore")
            .field("authenticated", &snapshot.session.is_authenticated())
            .field("restored", &snapshot.restored)
            .field("adapters", &self.inner.adapters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::persistence::{LocalStorage, MemoryStorage};

    fn user() -> User {
        User { id: 7, email: "nurse@clinic.test".into(), name: "Nurse Joy".into(), role: "staff".into() }
    }

    #[tokio::test]
    async fn restore_loads_persisted_session_once() {
        let storage = Arc::new(MemoryStorage::with_session("tok-9", user()));
        let store = SessionStore::new(vec![storage.clone()]);
        assert!(!store.is_restored());
        assert!(!store.is_authenticated());

        store.restore().await;
        assert!(store.is_restored());
        assert_eq!(store.token().as_deref(), Some("tok-9"));
        assert_eq!(store.user(), Some(user()));

        // A second restore does not clobber an explicit logout
        store.logout().await;
        store.restore().await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn login_and_logout_mirror_to_every_adapter() {
        let storage = Arc::new(MemoryStorage::new());
        let cookie = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(vec![storage.clone(), cookie.clone()]);

        store.login("tok-1", user()).await;
        assert!(store.is_authenticated());
        assert_eq!(storage.stored().map(|s| s.token), Some("tok-1".to_string()));
        assert_eq!(cookie.stored().map(|s| s.token), Some("tok-1".to_string()));

        store.logout().await;
        assert!(!store.is_authenticated());
        assert_eq!(store.user(), None);
        assert_eq!(storage.stored(), None);
        assert_eq!(cookie.stored(), None);
    }

    #[tokio::test]
    async fn persistence_failures_never_reach_the_caller() {
        let store = SessionStore::new(vec![Arc::new(MemoryStorage::failing())]);

        store.restore().await;
        assert!(store.is_restored());

        store.login("tok-2", user()).await;
        assert!(store.is_authenticated(), "memory state stays authoritative");

        store.logout().await;
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn corrupt_local_storage_is_cleared_on_restore() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::in_dir(dir.path()));
        tokio::fs::write(storage.path(), r#"{"access_token":"tok","user":"oops"}"#).await.unwrap();

        let store = SessionStore::new(vec![storage.clone()]);
        store.restore().await;

        assert!(store.is_restored());
        assert!(!store.is_authenticated());
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscribers_see_restore_completion() {
        let store = SessionStore::new(vec![Arc::new(MemoryStorage::with_session("tok-3", user()))]);
        let mut rx = store.subscribe();
        assert!(!rx.borrow().restored);

        store.restore().await;
        rx.changed().await.unwrap();
        assert!(rx.borrow().restored);
        assert!(rx.borrow().session.is_authenticated());
    }

    #[test]
    fn from_token_is_authenticated_without_profile() {
        let store = SessionStore::from_token("cookie-token");
        assert!(store.is_restored());
        assert!(store.is_authenticated());
        assert_eq!(store.user(), None);
    }
}
