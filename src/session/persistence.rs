// session/persistence.rs - Pluggable side-effect handlers behind the session store
//
// The store owns the authoritative in-memory session; adapters mirror it to
// somewhere durable. Adapters are only ever invoked from the store's mutate
// path (restore/login/logout).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::models::User;

/// Key/value names shared with the browser build of the console
pub const TOKEN_KEY: &str = "access_token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}

/// Token and profile as written by a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub user: User,
}

#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Read a previously saved session. Write-only adapters return `Ok(None)`.
    async fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    async fn clear(&self) -> Result<(), StorageError>;
}

async fn read_json_file<T>(path: &Path) -> Result<Option<T>, StorageError>
where
    T: serde::de::DeserializeOwned,
{
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::Io(e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StorageError::Corrupt(format!("{}: {}", path.display(), e)))
}

// Write to a sibling temp file then rename, so a crash never leaves half a file
async fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::Unavailable(format!("failed to serialize {}: {}", path.display(), e)))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Local key/value store: a JSON object of string keys to string values
///
/// Mirrors browser local storage, so the user profile is kept as a serialized
/// JSON string under `user`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `storage.json` inside the given directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(read_json_file(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl SessionPersistence for LocalStorage {
    fn name(&self) -> &'static str {
        "local-storage"
    }

    async fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        let entries = self.entries().await?;
        let (Some(token), Some(raw_user)) = (entries.get(TOKEN_KEY), entries.get(USER_KEY)) else {
            return Ok(None);
        };
        if token.is_empty() {
            return Ok(None);
        }
        let user: User = serde_json::from_str(raw_user)
            .map_err(|e| StorageError::Corrupt(format!("stored user is not valid JSON: {}", e)))?;
        Ok(Some(PersistedSession { token: token.clone(), user }))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        // Unrelated keys survive; a corrupt file is replaced
        let mut entries = self.entries().await.unwrap_or_default();
        let user = serde_json::to_string(&session.user)
            .map_err(|e| StorageError::Unavailable(format!("failed to serialize user: {}", e)))?;
        entries.insert(TOKEN_KEY.to_string(), session.token.clone());
        entries.insert(USER_KEY.to_string(), user);
        write_json_file(&self.path, &entries).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries().await.unwrap_or_default();
        entries.remove(TOKEN_KEY);
        entries.remove(USER_KEY);
        write_json_file(&self.path, &entries).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredCookie {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Cookie jar file holding the plain `access_token` cookie read by the edge guard
///
/// Write-only from the store's point of view: the cookie carries no profile,
/// so `load` never restores a session from it.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
    name: String,
    max_age: Duration,
}

impl CookieFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, max_age_secs: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            max_age: Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX).min(i64::MAX / 1000)),
        }
    }

    /// `cookies.json` inside the given directory
    pub fn in_dir(dir: &Path, name: impl Into<String>, max_age_secs: u64) -> Self {
        Self::new(dir.join("cookies.json"), name, max_age_secs)
    }

    /// Current cookie value; expired or empty cookies read as absent
    pub async fn value(&self) -> Option<String> {
        let jar: BTreeMap<String, StoredCookie> = match read_json_file(&self.path).await {
            Ok(jar) => jar.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("cookie jar unreadable, treating session cookie as absent: {}", e);
                return None;
            }
        };
        jar.get(&self.name)
            .filter(|c| c.expires_at > Utc::now() && !c.value.is_empty())
            .map(|c| c.value.clone())
    }

    async fn jar(&self) -> BTreeMap<String, StoredCookie> {
        read_json_file(&self.path).await.ok().flatten().unwrap_or_default()
    }
}

#[async_trait]
impl SessionPersistence for CookieFile {
    fn name(&self) -> &'static str {
        "cookie"
    }

    async fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(None)
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let mut jar = self.jar().await;
        jar.insert(
            self.name.clone(),
            StoredCookie {
                value: session.token.clone(),
                expires_at: Utc::now() + self.max_age,
            },
        );
        write_json_file(&self.path, &jar).await
    }

    // Equivalent of re-setting the cookie with max-age=0
    async fn clear(&self) -> Result<(), StorageError> {
        let mut jar = self.jar().await;
        jar.remove(&self.name);
        write_json_file(&self.path, &jar).await
    }
}

/// In-process adapter; `failing()` makes every call error to exercise best-effort paths
#[derive(Debug, Default)]
pub struct MemoryStorage {
    session: Mutex<Option<PersistedSession>>,
    failing: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(token: &str, user: User) -> Self {
        let storage = Self::default();
        if let Ok(mut slot) = storage.session.lock() {
            *slot = Some(PersistedSession { token: token.to_string(), user });
        }
        storage
    }

    pub fn failing() -> Self {
        let storage = Self::default();
        storage.failing.store(true, Ordering::SeqCst);
        storage
    }

    pub fn stored(&self) -> Option<PersistedSession> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory storage disabled".to_string()))
        } else {
            Ok(())
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<PersistedSession>>, StorageError> {
        self.session
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionPersistence for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        self.check()?;
        Ok(self.slot()?.clone())
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        self.check()?;
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User { id: 1, email: "admin@clinic.test".into(), name: "Admin".into(), role: "admin".into() }
    }

    #[tokio::test]
    async fn local_storage_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::in_dir(dir.path());
        tokio::fs::write(storage.path(), r#"{"theme":"dark"}"#).await.unwrap();

        assert_eq!(storage.load().await.unwrap(), None);

        let session = PersistedSession { token: "tok-1".into(), user: user() };
        storage.save(&session).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(session));

        storage.clear().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
        let raw = tokio::fs::read_to_string(storage.path()).await.unwrap();
        assert!(raw.contains("theme"), "unrelated keys should survive: {}", raw);
    }

    #[tokio::test]
    async fn local_storage_reports_corrupt_user() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::in_dir(dir.path());
        tokio::fs::write(storage.path(), r#"{"access_token":"tok","user":"{not json"}"#).await.unwrap();

        assert!(matches!(storage.load().await, Err(StorageError::Corrupt(_))));
    }

    #[tokio::test]
    async fn cookie_file_expires_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let session = PersistedSession { token: "tok-2".into(), user: user() };

        let cookie = CookieFile::in_dir(dir.path(), "access_token", 60);
        assert_eq!(cookie.value().await, None);
        cookie.save(&session).await.unwrap();
        assert_eq!(cookie.value().await.as_deref(), Some("tok-2"));
        assert_eq!(cookie.load().await.unwrap(), None, "cookie never restores a session");
        cookie.clear().await.unwrap();
        assert_eq!(cookie.value().await, None);

        let expired = CookieFile::in_dir(dir.path(), "access_token", 0);
        expired.save(&session).await.unwrap();
        assert_eq!(expired.value().await, None);
    }

    #[tokio::test]
    async fn failing_memory_storage_errors_on_every_call() {
        let storage = MemoryStorage::failing();
        assert!(storage.load().await.is_err());
        assert!(storage.clear().await.is_err());
    }
}
