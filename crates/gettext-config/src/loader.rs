//! Configuration loading utilities

use crate::validator::ConfigValidator;
use crate::TranslatorConfig;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "GETTEXT_CONFIG_PATH";

/// Files probed in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["gettext.yaml", "gettext.yml", "gettext.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path:?}: {source}")]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParse {
        /// Variable name
        var: String,
        /// Parse failure
        message: String,
    },

    /// Configuration validation error
    #[error("Invalid configuration field '{field}': {message}")]
    Validation {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Creates a validation error for the given field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Configuration loader for the translator
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<TranslatorConfig, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::parse(&content, path)?;
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from `GETTEXT_CONFIG_PATH`, a default file, or defaults
    pub fn load() -> Result<TranslatorConfig, ConfigError> {
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            return Self::load_from_file(config_path);
        }

        if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
        {
            return Self::load_from_file(path);
        }

        debug!("No configuration file found, using defaults");
        let mut config = TranslatorConfig::default();
        Self::apply_env_overrides(&mut config)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Parse configuration text, choosing the format from the file extension
    pub fn parse(content: &str, path: &Path) -> Result<TranslatorConfig, ConfigError> {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            Ok(toml::from_str(content)?)
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut TranslatorConfig) -> Result<(), ConfigError> {
        if let Ok(lang) = env::var("GETTEXT_LANG") {
            config.lang = lang;
        }

        if let Ok(mode) = env::var("GETTEXT_PRODUCTION_MODE") {
            config.production_mode = parse_bool("GETTEXT_PRODUCTION_MODE", &mode)?;
        }

        if let Ok(namespace) = env::var("GETTEXT_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Ok(expire) = env::var("GETTEXT_CACHE_EXPIRE_SECONDS") {
            config.cache.expire_seconds =
                expire.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::EnvParse {
                        var: "GETTEXT_CACHE_EXPIRE_SECONDS".to_string(),
                        message: e.to_string(),
                    }
                })?;
        }

        Ok(())
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::EnvParse {
            var: var.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}
