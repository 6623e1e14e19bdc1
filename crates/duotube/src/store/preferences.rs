use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::model::{CanonicalVideo, SourceKind};

pub const DEFAULT_REGION: &str = "US";
pub const DEFAULT_MAX_RESULTS: u32 = 20;
/// Search history keeps at most this many queries.
pub const HISTORY_LIMIT: usize = 20;

/// Storage keys.
pub mod keys {
    pub const API_KEY: &str = "api-key";
    pub const SETTINGS: &str = "app-settings";
    pub const SOURCE_PREFERENCE: &str = "source-preference";
    pub const MIRROR_INSTANCE: &str = "mirror-instance";
    pub const SEARCH_HISTORY: &str = "search-history";
    pub const VIDEO_CACHE: &str = "video-data";

    pub const ALL: [&str; 6] = [
        API_KEY,
        SETTINGS,
        SOURCE_PREFERENCE,
        MIRROR_INSTANCE,
        SEARCH_HISTORY,
        VIDEO_CACHE,
    ];
}

/// User settings blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub region_code: String,
    pub max_results: u32,
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region_code: DEFAULT_REGION.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            theme: "dark".to_string(),
        }
    }
}

/// Typed view over the persisted key/value store.
///
/// Every value is stored JSON-encoded. An absent or undecodable value reads
/// as the default.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Ignoring undecodable stored value");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.store.set(key, raw),
            Err(e) => warn!(key, error = %e, "Failed to encode value for storage"),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.read::<String>(keys::API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&self, key: &str) {
        self.write(keys::API_KEY, key.trim());
    }

    pub fn clear_api_key(&self) {
        self.store.remove(keys::API_KEY);
    }

    pub fn settings(&self) -> Settings {
        self.read(keys::SETTINGS).unwrap_or_default()
    }

    pub fn set_settings(&self, settings: &Settings) {
        self.write(keys::SETTINGS, settings);
    }

    pub fn source_preference(&self) -> SourceKind {
        self.read(keys::SOURCE_PREFERENCE).unwrap_or_default()
    }

    pub fn set_source_preference(&self, source: SourceKind) {
        debug!(%source, "Storing source preference");
        self.write(keys::SOURCE_PREFERENCE, &source);
    }

    pub fn mirror_instance(&self) -> Option<String> {
        self.read(keys::MIRROR_INSTANCE)
    }

    pub fn set_mirror_instance(&self, instance: &str) {
        self.write(keys::MIRROR_INSTANCE, instance);
    }

    /// Most recent query first.
    pub fn search_history(&self) -> Vec<String> {
        self.read(keys::SEARCH_HISTORY).unwrap_or_default()
    }

    /// Moves `query` to the front, dropping any older copy and anything past
    /// [`HISTORY_LIMIT`].
    pub fn add_search_to_history(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let mut history = self.search_history();
        history.retain(|q| q != query);
        history.insert(0, query.to_string());
        history.truncate(HISTORY_LIMIT);
        self.write(keys::SEARCH_HISTORY, &history);
    }

    pub fn clear_search_history(&self) {
        self.store.remove(keys::SEARCH_HISTORY);
    }

    /// Last result set, if one was cached.
    pub fn cached_videos(&self) -> Option<Vec<CanonicalVideo>> {
        self.read(keys::VIDEO_CACHE)
    }

    pub fn store_cached_videos(&self, videos: &[CanonicalVideo]) {
        self.write(keys::VIDEO_CACHE, videos);
    }

    /// Drops cached results and search history only.
    pub fn clear_video_data(&self) {
        self.store.remove(keys::VIDEO_CACHE);
        self.store.remove(keys::SEARCH_HISTORY);
    }

    /// Full reset, including key, preference and mirror selection.
    pub fn clear_all(&self) {
        for key in keys::ALL {
            self.store.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn prefs() -> (Arc<MemoryStore>, Preferences) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), Preferences::new(store))
    }

    #[test]
    fn defaults_when_absent() {
        let (_, prefs) = prefs();
        assert_eq!(prefs.source_preference(), SourceKind::Mirror);
        assert_eq!(prefs.settings(), Settings::default());
        assert!(prefs.api_key().is_none());
        assert!(prefs.mirror_instance().is_none());
        assert!(prefs.search_history().is_empty());
        assert!(prefs.cached_videos().is_none());
    }

    #[test]
    fn values_are_json_encoded() {
        let (store, prefs) = prefs();
        prefs.set_source_preference(SourceKind::Primary);
        prefs.set_api_key(" AIzaKey ");
        assert_eq!(store.get(keys::SOURCE_PREFERENCE).as_deref(), Some("\"primary\""));
        assert_eq!(store.get(keys::API_KEY).as_deref(), Some("\"AIzaKey\""));
    }

    #[test]
    fn undecodable_values_read_as_default() {
        let (store, prefs) = prefs();
        store.set(keys::SOURCE_PREFERENCE, "youtube".to_string());
        store.set(keys::SETTINGS, "{not json".to_string());
        assert_eq!(prefs.source_preference(), SourceKind::Mirror);
        assert_eq!(prefs.settings(), Settings::default());
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let (store, prefs) = prefs();
        store.set(keys::SETTINGS, r#"{"regionCode":"DE"}"#.to_string());
        let settings = prefs.settings();
        assert_eq!(settings.region_code, "DE");
        assert_eq!(settings.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn history_moves_repeats_to_front() {
        let (_, prefs) = prefs();
        prefs.add_search_to_history("rust");
        prefs.add_search_to_history("tokio");
        prefs.add_search_to_history("serde");
        prefs.add_search_to_history("rust");

        assert_eq!(prefs.search_history(), vec!["rust", "serde", "tokio"]);
    }

    #[test]
    fn history_is_capped() {
        let (_, prefs) = prefs();
        for i in 0..HISTORY_LIMIT {
            prefs.add_search_to_history(&format!("query {i}"));
        }
        assert_eq!(prefs.search_history().len(), HISTORY_LIMIT);

        prefs.add_search_to_history("one more");
        let history = prefs.search_history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0], "one more");
        assert!(!history.contains(&"query 0".to_string()));
        assert_eq!(history[HISTORY_LIMIT - 1], "query 1");
    }

    #[test]
    fn clear_video_data_keeps_preferences() {
        let (store, prefs) = prefs();
        prefs.set_source_preference(SourceKind::Primary);
        prefs.set_mirror_instance("https://yewtu.be");
        prefs.add_search_to_history("q");
        prefs.store_cached_videos(&[]);

        prefs.clear_video_data();
        assert!(prefs.search_history().is_empty());
        assert!(prefs.cached_videos().is_none());
        assert_eq!(prefs.source_preference(), SourceKind::Primary);

        prefs.clear_all();
        assert!(store.is_empty());
    }
}
