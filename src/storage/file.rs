// src/storage/file.rs
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{StateStore, StorageResult};

/// File-backed store keeping one snapshot as a single JSON blob.
///
/// Saves write a sibling `.tmp` file and rename it into place, so a reader
/// never observes a half-written blob. Parent directories are created on
/// demand. The files are plain pretty-printed JSON and meant to be
/// inspectable by hand.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl<T: Serialize + DeserializeOwned> StateStore<T> for JsonFileStore {
    fn load(&self) -> StorageResult<Option<T>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_slice(&raw)?;
        Ok(Some(value))
    }

    fn save(&self, state: &T) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_vec_pretty(state)?;
        let tmp = self.temp_path();
        fs::write(&tmp, &serialized)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Flushed {} bytes to {}", serialized.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct Snapshot {
        names: Vec<String>,
        revision: u32,
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            names: vec!["Ava".into(), "Ben".into()],
            revision: 7,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        store.save(&snapshot()).unwrap();
        let loaded: Option<Snapshot> = store.load().unwrap();

        assert_eq!(loaded, Some(snapshot()));
    }

    #[test]
    fn load_of_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        let loaded: Option<Snapshot> = store.load().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/deeper/state.json"));

        store.save(&snapshot()).unwrap();
        let loaded: Option<Snapshot> = store.load().unwrap();
        assert_eq!(loaded, Some(snapshot()));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::new(path.clone());

        store.save(&snapshot()).unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn corrupt_blob_surfaces_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonFileStore::new(path);
        let loaded: StorageResult<Option<Snapshot>> = store.load();
        assert!(loaded.is_err());
    }

    #[test]
    fn save_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("block");
        fs::write(&blocker, b"in the way").unwrap();

        let store = JsonFileStore::new(blocker.join("state.json"));
        assert!(store.save(&snapshot()).is_err());
    }
}
