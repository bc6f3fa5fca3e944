//! Recent route searches

use chrono::{DateTime, Utc};

use freightmap_types::{Result, RouteHistoryItem};

use crate::repository::KeyValueStore;

/// Storage key of the search history
pub const ROUTE_HISTORY_KEY: &str = "route_search_history";

/// Maximum number of remembered searches
pub const MAX_HISTORY_ITEMS: usize = 10;

/// Route search history, newest first
pub struct RouteHistory<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> RouteHistory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn entries(&self) -> Result<Vec<RouteHistoryItem>> {
        let Some(raw) = self.store.get(ROUTE_HISTORY_KEY)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    pub fn record(
        &self,
        from: &str,
        to: &str,
        cargo_type: Option<String>,
        weight: Option<String>,
    ) -> Result<Option<RouteHistoryItem>> {
        self.record_at(from, to, cargo_type, weight, Utc::now())
    }

    /// Remember a search. Blank endpoints and exact repeats are ignored
    /// and yield `None`.
    pub fn record_at(
        &self,
        from: &str,
        to: &str,
        cargo_type: Option<String>,
        weight: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<RouteHistoryItem>> {
        if from.trim().is_empty() || to.trim().is_empty() {
            return Ok(None);
        }

        let mut history = self.entries()?;
        if history.iter().any(|item| item.from == from && item.to == to) {
            return Ok(None);
        }

        let timestamp = now.timestamp_millis();
        let item = RouteHistoryItem {
            id: timestamp.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            timestamp,
            cargo_type,
            weight,
        };
        history.insert(0, item.clone());
        history.truncate(MAX_HISTORY_ITEMS);
        self.write(&history)?;
        Ok(Some(item))
    }

    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut history = self.entries()?;
        let before = history.len();
        history.retain(|item| item.id != id);
        if history.len() == before {
            return Ok(false);
        }
        self.write(&history)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(ROUTE_HISTORY_KEY)?;
        Ok(())
    }

    fn write(&self, history: &[RouteHistoryItem]) -> Result<()> {
        let raw = serde_json::to_string(history)?;
        self.store.set(ROUTE_HISTORY_KEY, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::TimeZone;
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

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn test_newest_first_and_capped() {
        let store = FakeStore::default();
        let history = RouteHistory::new(&store);
        for i in 0..12 {
            history
                .record_at(&format!("from{}", i), "to", None, None, at(i))
                .unwrap();
        }
        let entries = history.entries().unwrap();
        assert_eq!(entries.len(), MAX_HISTORY_ITEMS);
        assert_eq!(entries[0].from, "from11");
        assert_eq!(entries[9].from, "from2");
    }

    #[test]
    fn test_duplicates_and_blanks_ignored() {
        let store = FakeStore::default();
        let history = RouteHistory::new(&store);
        let first = history
            .record_at("Москва", "Казань", Some("box".into()), Some("120".into()), at(0))
            .unwrap();
        assert!(first.is_some());
        assert!(history.record_at("Москва", "Казань", None, None, at(1)).unwrap().is_none());
        assert!(history.record_at("", "Казань", None, None, at(2)).unwrap().is_none());
        assert!(history.record_at("Москва", "  ", None, None, at(3)).unwrap().is_none());
        assert_eq!(history.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let store = FakeStore::default();
        let history = RouteHistory::new(&store);
        let a = history.record_at("A", "B", None, None, at(0)).unwrap().unwrap();
        history.record_at("C", "D", None, None, at(1)).unwrap();
        assert!(history.remove(&a.id).unwrap());
        assert!(!history.remove(&a.id).unwrap());
        assert_eq!(history.entries().unwrap().len(), 1);

        history.clear().unwrap();
        assert!(history.entries().unwrap().is_empty());
        assert!(store.data.borrow().get(ROUTE_HISTORY_KEY).is_none());
    }
}
