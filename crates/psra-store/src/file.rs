//! Directory-backed store: one `<key>.json` file per key.
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so a reader never sees a half-written value. The writer lock is a
//! lock file in the directory and works across processes. There is no change
//! notification.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lock::{self, LOCK_FILE_NAME};
use crate::{ChangeFeed, KeyValueStore, StoreError, WriteGuard, check_key};

const VALUE_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// `StoreError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "opened file store");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.value_path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.value_path(key)?) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if check_key(stem).is_ok() {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort_unstable();
        Ok(keys)
    }

    fn lock(&self, timeout: Duration) -> Result<WriteGuard<'_>, StoreError> {
        lock::acquire(&self.dir.join(LOCK_FILE_NAME), timeout).map(WriteGuard::File)
    }

    fn watch(&self) -> Option<ChangeFeed> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_survive_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path().join("store")).unwrap();
        store.set("psra_counters", r#"{"incident":3}"#).unwrap();

        let reopened = FileStore::open(temp.path().join("store")).unwrap();
        assert_eq!(
            reopened.get("psra_counters").unwrap().as_deref(),
            Some(r#"{"incident":3}"#)
        );
    }

    #[test]
    fn keys_ignore_lock_and_foreign_files() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store.set("psra_volunteers", "[]").unwrap();
        store.set("psra_incidents", "[]").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "x").unwrap();
        let _guard = store.lock(Duration::from_millis(50)).unwrap();

        assert_eq!(store.keys().unwrap(), vec!["psra_incidents", "psra_volunteers"]);
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        store.remove("psra_incidents").unwrap();
        assert_eq!(store.get("psra_incidents").unwrap(), None);
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "1"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn file_store_has_no_change_feed() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        assert!(store.watch().is_none());
    }
}
