//! Default values for the translator configuration.

use crate::schema::{CacheSettings, LoggingSettings, TranslatorConfig};
use indexmap::IndexMap;

/// Language used when none is configured.
pub const DEFAULT_LANG: &str = "en";

/// Namespace for cache keys and the session section.
pub const DEFAULT_NAMESPACE: &str = "GettextTranslator-Gettext";

/// Two hours.
pub const DEFAULT_CACHE_EXPIRE_SECONDS: u64 = 2 * 60 * 60;

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "gettext_catalog=info,gettext_tool=info";

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            files: IndexMap::new(),
            production_mode: false,
            namespace: DEFAULT_NAMESPACE.to_string(),
            cache: CacheSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            expire_seconds: DEFAULT_CACHE_EXPIRE_SECONDS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}
