//! # Gettext Catalog
//!
//! Gettext translation catalogs: binary MO loading, plural-form resolution,
//! untranslated-string tracking and MO/PO export.
//!
//! The entry point is [`GettextTranslator`], which implements the
//! [`Translator`] capability. It loads every registered source lazily,
//! optionally caching the merged [`Dictionary`] per language, and records
//! lookups that miss so they can be exported for translators.
//!
//! ```no_run
//! use gettext_catalog::{Collaborators, Form, GettextTranslator, Translator};
//!
//! # fn main() -> gettext_catalog::CatalogResult<()> {
//! let mut translator = GettextTranslator::with_defaults(Collaborators::in_memory());
//! translator.add_file("locale", "default")?.set_lang("cs")?;
//!
//! let text = translator.translate("%d file", Form::from(("%d files", 3)), &[3.into()])?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod dictionary;
pub mod error;
pub mod format;
pub mod loader;
pub mod metadata;
pub mod plural;
pub mod serializer;
pub mod store;
pub mod tracker;
pub mod translator;

pub use cache::CacheManager;
pub use dictionary::{CatalogEntry, Dictionary};
pub use error::{CatalogError, CatalogResult};
pub use format::{interpolate, FormatArg, FormatError};
pub use loader::{CatalogLoader, MoHeader, ParsedCatalog};
pub use metadata::Metadata;
pub use plural::{evaluate, PluralError, PluralForms};
pub use serializer::{build_mo, build_po};
pub use store::{
    AlreadySent, CacheDependencies, CacheStore, MemoryCacheStore, MemorySessionStore, NeverSent,
    ResponseSignal, SessionStore,
};
pub use tracker::{PendingStrings, UntranslatedTracker, NEW_STRINGS_KEY};
pub use translator::{Collaborators, Form, GettextTranslator, StringMap, StringTable, Translator};
