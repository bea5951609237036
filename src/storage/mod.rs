// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Durable Token Storage
//!
//! The bearer token is the only artifact the client persists. It lives under
//! a single named key; absence of the key means "logged out".
//!
//! ## Storage Layout
//!
//! ```text
//! <data_local_dir>/schedule-planner/
//!   token           # raw bearer token, no trailing newline
//! ```
//!
//! Writes are synchronous and complete before the caller continues, so a
//! subsequent read from any task observes them.

use std::io;
use std::sync::Mutex;

pub mod paths;
pub mod token_file;

pub use paths::StoragePaths;
pub use token_file::FileTokenStorage;

/// Error type for durable token storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Stored token is unreadable: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable key-value slot holding the bearer token.
pub trait TokenStorage: Send + Sync {
    /// Read the stored token. `Ok(None)` when nothing is stored.
    fn load(&self) -> StorageResult<Option<String>>;

    /// Persist the token, replacing any previous value.
    fn save(&self, token: &str) -> StorageResult<()>;

    /// Remove the stored token. Removing an absent token is not an error.
    fn remove(&self) -> StorageResult<()>;
}

/// Process-local storage, for tests and ephemeral clients.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> StorageResult<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Corrupt("memory slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, token: &str) -> StorageResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Corrupt("memory slot poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> StorageResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::Corrupt("memory slot poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryTokenStorage::new();
        assert_eq!(storage.load().unwrap(), None);

        storage.save("abc").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("abc"));

        storage.remove().unwrap();
        storage.remove().unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }
}
