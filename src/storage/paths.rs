// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the client's local storage layout.

use std::path::{Path, PathBuf};

/// Directory name under the platform data directory.
pub const APP_DIR: &str = "schedule-planner";

/// The single key under which the bearer token is stored.
pub const TOKEN_KEY: &str = "token";

/// Storage path utilities.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    /// Platform local data directory, falling back to the working directory.
    fn default() -> Self {
        let root = dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR}")));
        Self::new(root)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the durable token file.
    pub fn token_file(&self) -> PathBuf {
        self.root.join(TOKEN_KEY)
    }
}
