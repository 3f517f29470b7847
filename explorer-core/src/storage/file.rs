//! Disk-backed key-value store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::broadcast;

use super::{KeyValueStore, Notifier, StorageEvent, StoreHandleId};
use crate::error::StorageError;

/// Stores each key as `{dir}/{key}.json`.
///
/// Change notifications cover writes made through this instance. Writes by other
/// processes are picked up on the next `get`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    /// Serializes read-compare-write so notifications are not lost or doubled.
    write_lock: Mutex<()>,
    notifier: Notifier,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
            notifier: Notifier::new(),
        }
    }

    /// Get the default storage directory: ~/.recipe-explorer
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".recipe-explorer"))
            .unwrap_or_else(|| PathBuf::from("data/recipe-explorer"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read(key)
    }

    fn set(&self, key: &str, value: &str, origin: StoreHandleId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap();
        let previous = self.read(key).ok().flatten();

        fs::create_dir_all(&self.dir)?;
        // Write then rename so readers never see a partial file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        if previous.as_deref() != Some(value) {
            self.notifier.notify(key, Some(value.to_string()), origin);
        }
        Ok(())
    }

    fn remove(&self, key: &str, origin: StoreHandleId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap();
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                self.notifier.notify(key, None, origin);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.notifier.subscribe()
    }
}

/// Map a key to a filesystem-safe file stem.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .take(200)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_across_instances() {
        let dir = TempDir::new().unwrap();
        let origin = StoreHandleId::new();

        FileStore::new(dir.path().to_path_buf())
            .set("recipeExplorer.favoritesById", "{}", origin)
            .unwrap();

        let reopened = FileStore::new(dir.path().to_path_buf());
        assert_eq!(
            reopened.get("recipeExplorer.favoritesById").unwrap().as_deref(),
            Some("{}")
        );
        assert!(dir.path().join("recipeExplorer.favoritesById.json").exists());
    }

    #[test]
    fn test_missing_key_and_missing_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("not-created-yet"));
        assert_eq!(store.get("anything").unwrap(), None);
        store.remove("anything", StoreHandleId::new()).unwrap();
    }

    #[test]
    fn test_set_notifies_on_change_only() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let origin = StoreHandleId::new();
        let mut events = store.subscribe();

        store.set("k", "1", origin).unwrap();
        store.set("k", "1", origin).unwrap();
        store.remove("k", origin).unwrap();

        assert_eq!(events.try_recv().unwrap().new_value.as_deref(), Some("1"));
        assert_eq!(events.try_recv().unwrap().new_value, None);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("recipeExplorer.mealPlan.v1"), "recipeExplorer.mealPlan.v1");
        assert_eq!(sanitize_key("../etc/passwd"), ".._etc_passwd");
    }
}
