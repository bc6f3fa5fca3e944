//! Named routes kept in local storage

use freightmap_types::{Error, Result, SavedRoute};

use crate::repository::KeyValueStore;

/// Storage key of the saved route list
pub const SAVED_ROUTES_KEY: &str = "saved_routes";

/// Saved routes, stored as a single JSON array under [`SAVED_ROUTES_KEY`]
pub struct SavedRoutes<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SavedRoutes<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All saved routes in insertion order. An unreadable blob counts as empty.
    pub fn list(&self) -> Result<Vec<SavedRoute>> {
        let Some(raw) = self.store.get(SAVED_ROUTES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(routes) => Ok(routes),
            Err(e) => {
                log::warn!("Ignoring unreadable saved routes: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn find(&self, id: &str) -> Result<Option<SavedRoute>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Save a new route. Both endpoints are required; the name defaults to "from → to".
    pub fn save(&self, from: &str, to: &str, name: Option<&str>) -> Result<SavedRoute> {
        let from = from.trim();
        let to = to.trim();
        if from.is_empty() || to.is_empty() {
            return Err(Error::InvalidInput("route needs both 'from' and 'to'".to_string()));
        }
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} → {}", from, to));

        let route = SavedRoute {
            id: uuid::Uuid::new_v4().to_string(),
            from: from.to_string(),
            to: to.to_string(),
            name,
        };

        let mut routes = self.list()?;
        routes.push(route.clone());
        self.write(&routes)?;
        Ok(route)
    }

    /// Remove a route by id
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut routes = self.list()?;
        let before = routes.len();
        routes.retain(|r| r.id != id);
        if routes.len() == before {
            return Err(Error::RouteNotFound(id.to_string()));
        }
        self.write(&routes)
    }

    fn write(&self, routes: &[SavedRoute]) -> Result<()> {
        let raw = serde_json::to_string(routes)?;
        self.store.set(SAVED_ROUTES_KEY, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use freightmap_types::StoreError;

    #[derive(Default)]
    struct FakeStore {
        data: RefCell<HashMap<String, String>>,
    }

    impl KeyValueStore for FakeStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            Ok(self.data.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
            self.data.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
            self.data.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn test_save_list_remove() {
        let store = FakeStore::default();
        let routes = SavedRoutes::new(&store);
        assert!(routes.list().unwrap().is_empty());

        let first = routes.save("Москва", "Казань", Some("Работа")).unwrap();
        let second = routes.save(" Омск ", "Тюмень", None).unwrap();
        assert_eq!(second.from, "Омск");
        assert_eq!(second.name, "Омск → Тюмень");

        let listed = routes.list().unwrap();
        assert_eq!(listed, vec![first.clone(), second.clone()]);
        assert_eq!(routes.find(&first.id).unwrap(), Some(first.clone()));

        routes.remove(&first.id).unwrap();
        assert_eq!(routes.list().unwrap(), vec![second]);
        assert!(matches!(routes.remove(&first.id), Err(Error::RouteNotFound(_))));
    }

    #[test]
    fn test_blank_endpoint_rejected() {
        let store = FakeStore::default();
        let routes = SavedRoutes::new(&store);
        assert!(matches!(routes.save("Москва", "  ", None), Err(Error::InvalidInput(_))));
        assert!(store.data.borrow().is_empty());
    }

    #[test]
    fn test_corrupted_blob_reads_as_empty() {
        let store = FakeStore::default();
        store.set(SAVED_ROUTES_KEY, "{not json").unwrap();
        let routes = SavedRoutes::new(&store);
        assert!(routes.list().unwrap().is_empty());
        routes.save("A", "B", None).unwrap();
        assert_eq!(routes.list().unwrap().len(), 1);
    }
}
