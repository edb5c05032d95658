//! Configuration schema definitions using serde.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for the translator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Active language code (e.g. `cs`).
    pub lang: String,
    /// Catalog sources, identifier to directory, in registration order.
    pub files: IndexMap<String, PathBuf>,
    /// Enables the parsed-dictionary cache.
    pub production_mode: bool,
    /// Prefix for cache keys and the session section name.
    pub namespace: String,
    /// Cache configuration.
    pub cache: CacheSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Dictionary cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Lifetime of a cached dictionary in seconds.
    pub expire_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive passed to the env filter.
    pub level: String,
    /// Emit JSON records instead of plain lines.
    pub json: bool,
}

impl LoggingSettings {
    /// Converts to the shared logging configuration.
    pub fn to_logging_config(&self) -> gettext_common::LoggingConfig {
        gettext_common::LoggingConfig {
            level: self.level.clone(),
            format: if self.json {
                gettext_common::LogFormat::Json
            } else {
                gettext_common::LogFormat::Plain
            },
            ..gettext_common::LoggingConfig::default()
        }
    }
}
