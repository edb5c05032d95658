//! Error types for catalog operations

use crate::format::FormatError;
use crate::plural::PluralError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, querying or saving catalogs
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The bytes are not a gettext MO catalog
    #[error("Not a gettext MO file{}: {reason}", path_suffix(.path))]
    InvalidFormat {
        /// File the bytes came from, when known
        path: Option<PathBuf>,
        /// What was wrong
        reason: String,
    },

    /// A source identifier was registered twice
    #[error("Language file identified '{0}' is already registered")]
    DuplicateIdentifier(String),

    /// A source directory does not exist
    #[error("Directory {0:?} doesn't exist")]
    MissingDirectory(PathBuf),

    /// The language was read before being set
    #[error("Language must be defined")]
    UndefinedLanguage,

    /// The language was set to a blank string
    #[error("Language must be a non-empty string")]
    EmptyLanguage,

    /// A dictionary load was attempted without any registered source
    #[error("Language file(s) must be defined")]
    SourcesUndefined,

    /// Save was called before the dictionary was loaded
    #[error("Nothing to save, translations are not loaded")]
    DictionaryNotLoaded,

    /// Save referenced an identifier that was never registered
    #[error("Gettext file identified as '{0}' does not exist")]
    UnknownSource(String),

    /// A `Plural-Forms` expression could not be parsed or evaluated
    #[error("Plural expression error: {0}")]
    Plural(#[from] PluralError),

    /// Positional interpolation failed
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// A session payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Creates an invalid-format error without a file path.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: None,
            reason: reason.into(),
        }
    }

    /// Attaches a file path to an invalid-format error; other variants pass through.
    #[must_use]
    pub fn with_path(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Self::InvalidFormat { path: None, reason } => Self::InvalidFormat {
                path: Some(file.into()),
                reason,
            },
            other => other,
        }
    }
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
