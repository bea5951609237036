// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed token storage.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{StorageError, StorageResult, StoragePaths, TokenStorage};

/// Stores the bearer token in a single file.
///
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write never leaves a truncated token behind.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn from_paths(paths: &StoragePaths) -> Self {
        Self::new(paths.token_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> StorageResult<Option<String>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token = String::from_utf8(raw)
            .map_err(|e| StorageError::Corrupt(format!("{}: {e}", self.path.display())))?;
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    fn save(&self, token: &str) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(token.as_bytes())?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), "Token persisted");
        Ok(())
    }

    fn remove(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Token removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage() -> (tempfile::TempDir, FileTokenStorage) {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = FileTokenStorage::from_paths(&StoragePaths::new(dir.path().join("nested")));
        (dir, storage)
    }

    #[test]
    fn missing_file_means_logged_out() {
        let (_dir, storage) = test_storage();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn save_creates_parent_and_overwrites() {
        let (_dir, storage) = test_storage();
        storage.save("first").unwrap();
        storage.save("second").unwrap();

        assert_eq!(storage.load().unwrap().as_deref(), Some("second"));
        assert!(!storage.path().with_extension("tmp").exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, storage) = test_storage();
        storage.save("abc").unwrap();
        storage.remove().unwrap();
        storage.remove().unwrap();

        assert!(!storage.path().exists());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn blank_file_is_treated_as_absent() {
        let (_dir, storage) = test_storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "  \n").unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn non_utf8_file_is_corrupt() {
        let (_dir, storage) = test_storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
    }
}
