//! Production-mode dictionary cache

use crate::dictionary::Dictionary;
use crate::store::{CacheDependencies, CacheStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Memoizes parsed dictionaries per language in a [`CacheStore`]
#[derive(Debug, Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    namespace: String,
    expire: Duration,
}

impl CacheManager {
    /// Creates a manager writing into `store` under `namespace`.
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>, expire: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            expire,
        }
    }

    /// Cache key and tag of a language's dictionary.
    pub fn key(lang: &str) -> String {
        format!("dictionary-{lang}")
    }

    /// Cached dictionary for `lang`.
    pub fn get(&self, lang: &str) -> Option<Dictionary> {
        let dictionary = self.store.read(&self.namespace, &Self::key(lang));
        debug!(
            "Dictionary cache {} for '{}'",
            if dictionary.is_some() { "hit" } else { "miss" },
            lang
        );
        dictionary
    }

    /// Caches `dictionary`; it is dropped when any of `files` changes.
    pub fn put(&self, lang: &str, dictionary: &Dictionary, files: Vec<PathBuf>) {
        let key = Self::key(lang);
        let dependencies = CacheDependencies {
            expire: Some(self.expire),
            files,
            tags: vec![key.clone()],
        };
        self.store
            .write(&self.namespace, &key, dictionary.clone(), dependencies);
    }

    /// Drops the cached dictionary of `lang`.
    pub fn invalidate(&self, lang: &str) {
        debug!("Invalidating dictionary cache for '{}'", lang);
        self.store.clean(&self.namespace, &[Self::key(lang)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::CatalogEntry;
    use crate::store::MemoryCacheStore;

    #[test]
    fn test_put_get_invalidate() {
        let manager = CacheManager::new(
            Arc::new(MemoryCacheStore::new()),
            "GettextTranslator-Gettext",
            Duration::from_secs(7200),
        );
        let mut dictionary = Dictionary::new();
        dictionary.insert(CatalogEntry::singular("Yes", "Ano", "default"));

        assert!(manager.get("cs").is_none());
        manager.put("cs", &dictionary, Vec::new());
        manager.put("de", &dictionary, Vec::new());
        assert_eq!(manager.get("cs"), Some(dictionary));

        manager.invalidate("cs");
        assert!(manager.get("cs").is_none());
        assert!(manager.get("de").is_some());
    }

    #[test]
    fn test_key() {
        assert_eq!(CacheManager::key("cs"), "dictionary-cs");
    }
}
