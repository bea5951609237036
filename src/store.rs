// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session store: the current bearer token and user profile.
//!
//! One store is owned per client and shared (via `Arc`) by every request.
//! Mutations write through to durable storage before returning, so the
//! in-memory token and the persisted token never disagree after a
//! successful `set`/`clear`. Writers are serialized by the lock; the last
//! write wins.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::models::UserProfile;
use crate::storage::{MemoryTokenStorage, StorageResult, TokenStorage};

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub profile: Option<UserProfile>,
}

impl Session {
    pub fn new(token: impl Into<String>, profile: Option<UserProfile>) -> Self {
        Self {
            token: Some(token.into()),
            profile,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

pub struct SessionStore {
    session: RwLock<Session>,
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Open the store, restoring a previously persisted token.
    ///
    /// The profile is not persisted; a restored session has `profile: None`
    /// until the next login.
    pub fn open(storage: Arc<dyn TokenStorage>) -> StorageResult<Self> {
        let token = storage.load()?;
        if token.is_some() {
            info!("Restored persisted session token");
        }
        Ok(Self {
            session: RwLock::new(Session {
                token,
                profile: None,
            }),
            storage,
        })
    }

    /// Empty store backed by process memory.
    pub fn in_memory() -> Self {
        Self {
            session: RwLock::new(Session::default()),
            storage: Arc::new(MemoryTokenStorage::new()),
        }
    }

    pub fn get(&self) -> Session {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    /// Replace the session. Durable storage is updated first; if that fails
    /// the in-memory session is left untouched.
    ///
    /// The token is trimmed and a blank token counts as none, matching what
    /// [`TokenStorage::load`] gives back after a restart.
    pub fn set(&self, mut session: Session) -> StorageResult<()> {
        session.token = session
            .token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
        match session.token.as_deref() {
            Some(token) => self.storage.save(token)?,
            None => self.storage.remove()?,
        }
        *current = session;
        Ok(())
    }

    /// Log out. The in-memory session is cleared even if removing the
    /// durable copy fails; the storage error is still returned.
    pub fn clear(&self) -> StorageResult<()> {
        let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
        *current = Session::default();
        if let Err(e) = self.storage.remove() {
            warn!(error = %e, "Failed to remove persisted session token");
            return Err(e);
        }
        Ok(())
    }

    /// Log out only if the session still holds `token`.
    ///
    /// Returns `Ok(false)` and changes nothing when the session has moved on
    /// (a newer login, or already cleared). On a storage error the in-memory
    /// session is still cleared, as with [`SessionStore::clear`].
    pub fn clear_if_token(&self, token: &str) -> StorageResult<bool> {
        let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
        if current.token.as_deref() != Some(token) {
            return Ok(false);
        }
        *current = Session::default();
        if let Err(e) = self.storage.remove() {
            warn!(error = %e, "Failed to remove persisted session token");
            return Err(e);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileTokenStorage, StorageError};

    struct FailingStorage;

    impl TokenStorage for FailingStorage {
        fn load(&self) -> StorageResult<Option<String>> {
            Ok(None)
        }
        fn save(&self, _token: &str) -> StorageResult<()> {
            Err(StorageError::Corrupt("disk full".to_string()))
        }
        fn remove(&self) -> StorageResult<()> {
            Err(StorageError::Corrupt("read-only".to_string()))
        }
    }

    fn profile(nickname: &str) -> UserProfile {
        UserProfile {
            nickname: nickname.to_string(),
            ..UserProfile::default()
        }
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::in_memory();
        assert_eq!(store.get(), Session::default());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn set_writes_through_to_storage() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let store = SessionStore::open(storage.clone()).unwrap();

        store.set(Session::new("abc", Some(profile("张三")))).unwrap();

        assert_eq!(storage.load().unwrap().as_deref(), Some("abc"));
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(store.get().profile.unwrap().nickname, "张三");
    }

    #[test]
    fn clear_removes_durable_copy() {
        let storage = Arc::new(MemoryTokenStorage::with_token("abc"));
        let store = SessionStore::open(storage.clone()).unwrap();
        assert!(store.is_authenticated());

        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(store.get(), Session::default());
    }

    #[test]
    fn setting_tokenless_session_removes_durable_copy() {
        let storage = Arc::new(MemoryTokenStorage::with_token("abc"));
        let store = SessionStore::open(storage.clone()).unwrap();

        store.set(Session::default()).unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn failed_save_leaves_session_untouched() {
        let store = SessionStore::open(Arc::new(FailingStorage)).unwrap();
        assert!(store.set(Session::new("abc", None)).is_err());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn failed_remove_still_logs_out() {
        let store = SessionStore::open(Arc::new(FailingStorage)).unwrap();
        assert!(store.clear().is_err());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn blank_token_is_not_a_session() {
        let storage = Arc::new(MemoryTokenStorage::with_token("old"));
        let store = SessionStore::open(storage.clone()).unwrap();

        store.set(Session::new("  ", None)).unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn padded_token_survives_restart_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        let store = SessionStore::open(Arc::new(FileTokenStorage::new(&path))).unwrap();

        store.set(Session::new("  abc \n", None)).unwrap();

        let reopened = SessionStore::open(Arc::new(FileTokenStorage::new(&path))).unwrap();
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(reopened.token(), store.token());
    }

    #[test]
    fn clear_if_token_ignores_newer_session() {
        let storage = Arc::new(MemoryTokenStorage::with_token("old"));
        let store = SessionStore::open(storage.clone()).unwrap();
        store.set(Session::new("new", None)).unwrap();

        assert!(!store.clear_if_token("old").unwrap());
        assert_eq!(store.token().as_deref(), Some("new"));
        assert_eq!(storage.load().unwrap().as_deref(), Some("new"));

        assert!(store.clear_if_token("new").unwrap());
        assert!(!store.is_authenticated());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn restores_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");

        {
            let store = SessionStore::open(Arc::new(FileTokenStorage::new(&path))).unwrap();
            store.set(Session::new("persisted", Some(profile("a")))).unwrap();
        }

        let reopened = SessionStore::open(Arc::new(FileTokenStorage::new(&path))).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("persisted"));
        assert!(reopened.get().profile.is_none());
    }
}
