// session/mod.rs - Client-side session: owned state plus persistence adapters
pub mod persistence;
pub mod store;

pub use persistence::{
    CookieFile, LocalStorage, MemoryStorage, PersistedSession, SessionPersistence, StorageError,
};
pub use store::{Session, SessionSnapshot, SessionStore};
