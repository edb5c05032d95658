//! Collaborator interfaces and their in-memory implementations
//!
//! The translator never constructs these itself; callers inject them so that
//! the session and cache backends can be swapped for durable ones.

use crate::dictionary::Dictionary;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::debug;

/// Durable key-value store scoped by namespace, surviving across requests
pub trait SessionStore: Send + Sync + Debug {
    /// Value stored under `key` in `namespace`.
    fn load(&self, namespace: &str, key: &str) -> Option<serde_json::Value>;

    /// Stores `value` under `key` in `namespace`, replacing any previous value.
    fn store(&self, namespace: &str, key: &str, value: serde_json::Value);

    /// Removes `key` from `namespace`.
    fn remove(&self, namespace: &str, key: &str);

    /// Whether a session backs this store.
    fn is_available(&self) -> bool {
        true
    }
}

/// Session store held in process memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sections: RwLock<HashMap<String, HashMap<String, serde_json::Value>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, namespace: &str, key: &str) -> Option<serde_json::Value> {
        self.sections
            .read()
            .get(namespace)
            .and_then(|section| section.get(key))
            .cloned()
    }

    fn store(&self, namespace: &str, key: &str, value: serde_json::Value) {
        self.sections
            .write()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn remove(&self, namespace: &str, key: &str) {
        if let Some(section) = self.sections.write().get_mut(namespace) {
            section.remove(key);
        }
    }
}

/// Invalidation rules attached to a cached value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheDependencies {
    /// Lifetime of the value
    pub expire: Option<Duration>,
    /// Files whose modification invalidates the value
    pub files: Vec<PathBuf>,
    /// Tags the value can be cleaned by
    pub tags: Vec<String>,
}

/// Dictionary cache with expiry, file and tag invalidation
pub trait CacheStore: Send + Sync + Debug {
    /// Valid cached dictionary under `key`, if any.
    fn read(&self, namespace: &str, key: &str) -> Option<Dictionary>;

    /// Caches `dictionary` under `key`.
    fn write(&self, namespace: &str, key: &str, dictionary: Dictionary, dependencies: CacheDependencies);

    /// Drops every value carrying one of `tags`.
    fn clean(&self, namespace: &str, tags: &[String]);
}

#[derive(Debug, Clone)]
struct CachedDictionary {
    dictionary: Dictionary,
    cached_at: Instant,
    expire: Option<Duration>,
    files: Vec<(PathBuf, Option<SystemTime>)>,
    tags: Vec<String>,
}

impl CachedDictionary {
    fn is_valid(&self) -> bool {
        if let Some(expire) = self.expire {
            if self.cached_at.elapsed() >= expire {
                return false;
            }
        }

        self.files
            .iter()
            .all(|(path, modified)| modified_time(path) == *modified)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Cache store held in process memory
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<(String, String), CachedDictionary>,
}

impl MemoryCacheStore {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values, valid or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, namespace: &str, key: &str) -> Option<Dictionary> {
        let cache_key = (namespace.to_string(), key.to_string());
        if self
            .entries
            .remove_if(&cache_key, |_, cached| !cached.is_valid())
            .is_some()
        {
            debug!("Dropping stale cache entry {}/{}", namespace, key);
            return None;
        }

        self.entries
            .get(&cache_key)
            .map(|entry| entry.dictionary.clone())
    }

    fn write(&self, namespace: &str, key: &str, dictionary: Dictionary, dependencies: CacheDependencies) {
        let files = dependencies
            .files
            .into_iter()
            .map(|path| {
                let modified = modified_time(&path);
                (path, modified)
            })
            .collect();

        self.entries.insert(
            (namespace.to_string(), key.to_string()),
            CachedDictionary {
                dictionary,
                cached_at: Instant::now(),
                expire: dependencies.expire,
                files,
                tags: dependencies.tags,
            },
        );
    }

    fn clean(&self, namespace: &str, tags: &[String]) {
        self.entries.retain(|(entry_namespace, _), cached| {
            entry_namespace != namespace || !cached.tags.iter().any(|tag| tags.contains(tag))
        });
    }
}

/// Whether implicit state can still be attached to the outgoing response
pub trait ResponseSignal: Send + Sync + Debug {
    /// `true` once the response has been sent.
    fn is_sent(&self) -> bool;
}

/// Response that is never sent, e.g. a command-line run
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverSent;

impl ResponseSignal for NeverSent {
    fn is_sent(&self) -> bool {
        false
    }
}

/// Response that has already been sent
#[derive(Debug, Clone, Copy, Default)]
pub struct AlreadySent;

impl ResponseSignal for AlreadySent {
    fn is_sent(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::CatalogEntry;
    use serde_json::json;

    fn dictionary() -> Dictionary {
        let mut dictionary = Dictionary::new();
        dictionary.insert(CatalogEntry::singular("Yes", "Ano", "default"));
        dictionary
    }

    #[test]
    fn test_session_store_is_namespaced() {
        let store = MemorySessionStore::new();
        store.store("one", "key", json!({"a": 1}));
        assert_eq!(store.load("one", "key"), Some(json!({"a": 1})));
        assert_eq!(store.load("two", "key"), None);

        store.remove("one", "key");
        assert_eq!(store.load("one", "key"), None);
        assert!(store.is_available());
    }

    #[test]
    fn test_cache_round_trip() {
        let cache = MemoryCacheStore::new();
        cache.write("ns", "dictionary-cs", dictionary(), CacheDependencies::default());
        assert_eq!(cache.read("ns", "dictionary-cs"), Some(dictionary()));
        assert_eq!(cache.read("other", "dictionary-cs"), None);
    }

    #[test]
    fn test_cache_expiry() {
        let cache = MemoryCacheStore::new();
        let dependencies = CacheDependencies {
            expire: Some(Duration::ZERO),
            ..CacheDependencies::default()
        };
        cache.write("ns", "dictionary-cs", dictionary(), dependencies);
        assert_eq!(cache.read("ns", "dictionary-cs"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stale_read_keeps_fresh_rewrite() {
        let cache = MemoryCacheStore::new();
        let expired = CacheDependencies {
            expire: Some(Duration::ZERO),
            ..CacheDependencies::default()
        };
        cache.write("ns", "dictionary-cs", dictionary(), expired);
        assert_eq!(cache.read("ns", "dictionary-cs"), None);

        cache.write("ns", "dictionary-cs", dictionary(), CacheDependencies::default());
        assert_eq!(cache.read("ns", "dictionary-cs"), Some(dictionary()));
        assert_eq!(cache.read("ns", "dictionary-cs"), Some(dictionary()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_clean_by_tag() {
        let cache = MemoryCacheStore::new();
        let tagged = |tag: &str| CacheDependencies {
            tags: vec![tag.to_string()],
            ..CacheDependencies::default()
        };
        cache.write("ns", "dictionary-cs", dictionary(), tagged("dictionary-cs"));
        cache.write("ns", "dictionary-de", dictionary(), tagged("dictionary-de"));

        cache.clean("ns", &["dictionary-cs".to_string()]);
        assert_eq!(cache.read("ns", "dictionary-cs"), None);
        assert!(cache.read("ns", "dictionary-de").is_some());
    }

    #[test]
    fn test_cache_file_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cs.default.mo");
        std::fs::write(&path, b"first").unwrap();

        let cache = MemoryCacheStore::new();
        let dependencies = CacheDependencies {
            files: vec![path.clone()],
            ..CacheDependencies::default()
        };
        cache.write("ns", "dictionary-cs", dictionary(), dependencies);
        assert!(cache.read("ns", "dictionary-cs").is_some());

        std::fs::remove_file(&path).unwrap();
        assert_eq!(cache.read("ns", "dictionary-cs"), None);
    }

    #[test]
    fn test_response_signals() {
        assert!(!NeverSent.is_sent());
        assert!(AlreadySent.is_sent());
    }
}
