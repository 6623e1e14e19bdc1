//! Local persisted state.
//!
//! The backing store is a plain string key/value map, the same contract as
//! browser local storage. [`Preferences`] layers typed, JSON-encoded values
//! on top of it.

mod file;
mod preferences;

use std::collections::HashMap;

use parking_lot::RwLock;

pub use file::FileStore;
pub use preferences::{
    DEFAULT_MAX_RESULTS, DEFAULT_REGION, HISTORY_LIMIT, Preferences, Settings, keys,
};

/// Generic get/set/remove storage.
///
/// Writes are last-writer-wins. Implementations never fail on a missing key;
/// persistence failures are logged by the implementation and not surfaced.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    fn remove(&self, key: &str);
}

/// Volatile store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.write().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());

        store.set("k", "v".to_string());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.remove("k");
        store.remove("never-set");
        assert!(store.is_empty());
    }
}
