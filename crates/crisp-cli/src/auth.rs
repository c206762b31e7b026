//! Keychain-backed session persistence for the CLI.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use crisp_core::session::{Session, TokenStore};
use crisp_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "crisp-cli";

/// [`TokenStore`] over the OS keychain, one entry per CLI profile.
#[derive(Clone)]
pub struct KeyringTokenStore {
    username: String,
}

impl KeyringTokenStore {
    #[must_use]
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("session:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }
}

impl TokenStore for KeyringTokenStore {
    #[cfg(not(test))]
    fn load_session(&self) -> Result<Option<Session>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> Result<Option<Session>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        if let Some(raw) = guard.get(&self.username) {
            Ok(Some(serde_json::from_str(raw)?))
        } else {
            Ok(None)
        }
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&raw)
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(())
    }

    #[cfg(test)]
    fn save_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_through_store() {
        let store = KeyringTokenStore::new("round-trip-profile");
        assert!(store.load_session().unwrap().is_none());

        let session = Session::new("tok-123");
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session().unwrap().unwrap().token, "tok-123");

        store.clear_session().unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn clearing_a_missing_session_is_not_an_error() {
        let store = KeyringTokenStore::new("never-saved-profile");
        store.clear_session().unwrap();
    }

    #[test]
    fn profiles_use_separate_entries() {
        let work = KeyringTokenStore::new("entry-work");
        let home = KeyringTokenStore::new("entry-home");

        work.save_session(&Session::new("work-token")).unwrap();
        assert!(home.load_session().unwrap().is_none());

        work.clear_session().unwrap();
    }
}
