//! Key-value stores backing saved routes and search history

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use freightmap_domain::repository::KeyValueStore;
use freightmap_types::StoreError;

/// All keys in one JSON object on disk
pub struct FileKeyValueStore {
    store_path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Create or load the store in `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("local_storage.json");

        let entries = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable store {}: {}", store_path.display(), e);
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            store_path,
            entries: RefCell::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.store_path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let file = File::create(&self.store_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &*self.entries.borrow())
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let removed = self.entries.borrow_mut().remove(key);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Process-local store, used when nothing should touch the disk
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freightmap_domain::service::SavedRoutes;
    use tempfile::tempdir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileKeyValueStore::open(dir.path().to_path_buf()).unwrap();
            store.set("saved_routes", "[]").unwrap();
            store.set("other", "x").unwrap();
            store.remove("other").unwrap();
        }
        let store = FileKeyValueStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.get("saved_routes").unwrap(), Some("[]".to_string()));
        assert_eq!(store.get("other").unwrap(), None);
    }

    #[test]
    fn test_unreadable_file_starts_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("local_storage.json"), "not json").unwrap();
        let store = FileKeyValueStore::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(store.get("saved_routes").unwrap(), None);
    }

    #[test]
    fn test_saved_routes_on_disk() {
        let dir = tempdir().unwrap();
        let store = FileKeyValueStore::open(dir.path().join("nested")).unwrap();
        let routes = SavedRoutes::new(&store);
        let route = routes.save("Москва", "Казань", None).unwrap();

        let reopened = FileKeyValueStore::open(dir.path().join("nested")).unwrap();
        let listed = SavedRoutes::new(&reopened).list().unwrap();
        assert_eq!(listed, vec![route]);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
