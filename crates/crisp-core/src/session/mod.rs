//! Session state and persistence seams.
//!
//! The browser dashboards this client replaces kept auth state as ambient
//! `localStorage` reads. Here the session is an explicit context object:
//! hydrated once from a [`TokenStore`] on `init`, injected into the API
//! client, and cleared everywhere on `teardown` (logout or a 401).

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An authenticated backend session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: None,
            email: None,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish()
    }
}

/// Durable session persistence (keychain on the CLI, in-memory in tests).
pub trait TokenStore: Clone + Send + Sync + 'static {
    fn load_session(&self) -> Result<Option<Session>>;
    fn save_session(&self, session: &Session) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

/// In-memory [`TokenStore`] used by tests and short-lived tooling.
#[derive(Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_session(&self) -> Result<Option<Session>> {
        let guard = self
            .slot
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Process-wide session context: single source of truth for auth state.
#[derive(Clone)]
pub struct SessionContext<S: TokenStore> {
    store: S,
    current: Arc<Mutex<Option<Session>>>,
}

impl<S: TokenStore> SessionContext<S> {
    /// Hydrate the context from persisted storage once.
    pub fn init(store: S) -> Result<Self> {
        let current = store.load_session()?;
        Ok(Self {
            store,
            current: Arc::new(Mutex::new(current)),
        })
    }

    /// Current session, if signed in.
    pub fn current(&self) -> Result<Option<Session>> {
        let guard = self
            .current
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(guard.clone())
    }

    /// Replace the session in memory and in persisted storage.
    pub fn establish(&self, session: Session) -> Result<()> {
        self.store.save_session(&session)?;
        let mut guard = self
            .current
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = Some(session);
        Ok(())
    }

    /// Clear the session everywhere (logout, or a fatal 401).
    pub fn teardown(&self) -> Result<()> {
        self.store.clear_session()?;
        let mut guard = self
            .current
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_redacts_token() {
        let session = Session::new("secret-token");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn context_hydrates_once_from_store() {
        let store = MemoryTokenStore::with_session(Session::new("abc"));
        let context = SessionContext::init(store.clone()).unwrap();
        assert_eq!(context.current().unwrap().unwrap().token, "abc");

        // Mutating the store after init does not change the hydrated context.
        store.clear_session().unwrap();
        assert!(context.current().unwrap().is_some());
    }

    #[test]
    fn teardown_clears_memory_and_store() {
        let store = MemoryTokenStore::new();
        let context = SessionContext::init(store.clone()).unwrap();
        context.establish(Session::new("abc")).unwrap();
        assert!(store.load_session().unwrap().is_some());

        context.teardown().unwrap();
        assert!(context.current().unwrap().is_none());
        assert!(store.load_session().unwrap().is_none());
    }
}
