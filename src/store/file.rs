//! File-backed key/value store with atomic writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::KeyValueStore;
use crate::error::{Result, WalkError};

/// Extension of value files.
const VALUE_SUFFIX: &str = ".json";

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Lock file suffix for concurrent access prevention.
const LOCK_SUFFIX: &str = ".lock";

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is synced and renamed over the value
/// file while holding an exclusive lock, so a reader never sees a torn value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the value files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the value file for `key`.
    #[must_use]
    pub fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{VALUE_SUFFIX}"))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{VALUE_SUFFIX}{TMP_SUFFIX}"))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}{VALUE_SUFFIX}{LOCK_SUFFIX}"))
    }

    fn lock_exclusive(&self, key: &str) -> Result<File> {
        let path = self.lock_path(key);
        let lock_file = File::create(&path)?;
        FileExt::lock_exclusive(&lock_file).map_err(|e| WalkError::StoreLock {
            path,
            message: e.to_string(),
        })?;
        Ok(lock_file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value_path = self.value_path(key);
        if !value_path.exists() {
            return Ok(None);
        }

        let lock_path = self.lock_path(key);
        let _lock = if lock_path.exists() {
            let lock_file = File::open(&lock_path)?;
            FileExt::lock_shared(&lock_file).map_err(|e| WalkError::StoreLock {
                path: lock_path.clone(),
                message: e.to_string(),
            })?;
            Some(lock_file)
        } else {
            None
        };

        match fs::read_to_string(&value_path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let _lock = self.lock_exclusive(key)?;

        let tmp_path = self.tmp_path(key);
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;

        fs::rename(&tmp_path, self.value_path(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let value_path = self.value_path(key);
        if !value_path.exists() {
            return Ok(());
        }

        let _lock = self.lock_exclusive(key)?;
        match fs::remove_file(&value_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProgressRecord;
    use crate::store::{ProgressStore, DEFAULT_KEY};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp_dir.path().join("state"));
        (store, temp_dir)
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (store, _temp_dir) = test_store();
        assert!(store.get("absent").unwrap().is_none());
    }

    #[test]
    fn test_set_creates_directory_and_file() {
        let (store, _temp_dir) = test_store();
        assert!(!store.dir().exists());

        store.set("k", "value").unwrap();

        assert!(store.dir().exists());
        assert!(store.value_path("k").exists());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_no_tmp_file_after_set() {
        let (store, _temp_dir) = test_store();
        store.set("k", "value").unwrap();
        assert!(!store.tmp_path("k").exists());
    }

    #[test]
    fn test_set_overwrites() {
        let (store, _temp_dir) = test_store();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_remove_deletes_and_tolerates_missing() {
        let (store, _temp_dir) = test_store();
        store.remove("k").unwrap();

        store.set("k", "value").unwrap();
        store.remove("k").unwrap();
        assert!(!store.value_path("k").exists());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_value_path_layout() {
        let store = FileStore::new("/var/lib/tilewalk");
        assert_eq!(
            store.value_path(DEFAULT_KEY),
            PathBuf::from("/var/lib/tilewalk/TILEWALK_PROGRESS_V1.json")
        );
    }

    #[test]
    fn test_lock_released_after_write() {
        let (store, _temp_dir) = test_store();
        store.set("k", "one").unwrap();

        let lock_file = File::open(store.lock_path("k")).expect("open lock file");
        FileExt::lock_exclusive(&lock_file).expect("acquire lock");
        FileExt::unlock(&lock_file).expect("release lock");

        store.set("k", "two").expect("write after unlock should succeed");
    }

    #[test]
    fn test_progress_record_survives_new_store_instance() {
        let (store, temp_dir) = test_store();
        let progress = ProgressStore::new(Arc::new(store), DEFAULT_KEY);
        progress
            .save(&ProgressRecord {
                running: true,
                index: 5,
            })
            .unwrap();

        let reopened = ProgressStore::new(
            Arc::new(FileStore::new(temp_dir.path().join("state"))),
            DEFAULT_KEY,
        );
        assert_eq!(
            reopened.load().unwrap(),
            Some(ProgressRecord {
                running: true,
                index: 5
            })
        );
    }

    #[test]
    fn test_corrupted_file_reads_as_no_record() {
        let (store, _temp_dir) = test_store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.value_path(DEFAULT_KEY), "not valid json {{{").unwrap();

        let progress = ProgressStore::new(Arc::new(store.clone()), DEFAULT_KEY);
        assert!(progress.load().unwrap().is_none());
        // Left in place; the next save overwrites it.
        assert!(store.value_path(DEFAULT_KEY).exists());
    }
}
