//! Runtime validation of translator configuration.

use crate::loader::ConfigError;
use crate::schema::TranslatorConfig;
use gettext_common::is_blank;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration.
    pub fn validate(config: &TranslatorConfig) -> Result<(), ConfigError> {
        config.validate()
    }
}

impl TranslatorConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_blank(&self.lang) {
            return Err(ConfigError::validation("lang", "language cannot be empty"));
        }

        if is_blank(&self.namespace) {
            return Err(ConfigError::validation(
                "namespace",
                "namespace cannot be empty",
            ));
        }

        if let Some(identifier) = self.files.keys().find(|id| is_blank(id)) {
            return Err(ConfigError::validation(
                "files",
                format!("file identifier '{identifier}' cannot be blank"),
            ));
        }

        if self.cache.expire_seconds == 0 {
            return Err(ConfigError::validation(
                "cache.expire_seconds",
                "cache expiry must be positive",
            ));
        }

        Ok(())
    }
}
