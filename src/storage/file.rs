//! File-backed storage
//!
//! Each key lives in `<dir>/<key>.json`. Writes land in a sibling
//! `.tmp` file first and are renamed into place, so a crash mid-write
//! leaves the previous snapshot intact.

use super::{check_quota, BuildStorage};
use crate::{BridgeError, Result};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage rooted at a data directory
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<u64>,
}

impl FileStorage {
    /// Open storage under `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            BridgeError::Storage(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        debug!("File storage opened at {:?}", dir);
        Ok(Self { dir, quota: None })
    }

    /// Limit the size of a single stored value
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(|c| c == '/' || c == '\\') || key.contains("..") {
            return Err(BridgeError::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BuildStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!("Read {} bytes from {:?}", text.len(), path);
                Ok(Some(text))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BridgeError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        check_quota(value, self.quota)?;

        let path = self.path_for(key)?;
        let mut tmp = path.clone();
        tmp.set_extension("tmp");

        fs::write(&tmp, value)
            .map_err(|e| BridgeError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path).map_err(|e| {
            BridgeError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert!(storage.path_for("storedBuilds").is_ok());
        assert!(storage.path_for("../escape").is_err());
        assert!(storage.path_for("a/b").is_err());
        assert!(storage.path_for("").is_err());
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        storage.write("storedBuilds", "{}").unwrap();

        assert!(dir.path().join("storedBuilds.json").exists());
        assert!(!dir.path().join("storedBuilds.tmp").exists());
    }
}
