//! The gettext translator
//!
//! [`GettextTranslator`] owns the registered sources, the active language and
//! the lazily loaded [`Dictionary`]. Lookups that miss the dictionary are
//! handed to the [`UntranslatedTracker`]; [`GettextTranslator::save`] writes
//! one source back to disk as MO and PO files.

use crate::cache::CacheManager;
use crate::dictionary::{CatalogEntry, Dictionary};
use crate::error::{CatalogError, CatalogResult};
use crate::format::{interpolate, FormatArg};
use crate::loader::CatalogLoader;
use crate::plural;
use crate::serializer::{build_mo, build_po};
use crate::store::{
    CacheStore, MemoryCacheStore, MemorySessionStore, NeverSent, ResponseSignal, SessionStore,
};
use crate::tracker::{UntranslatedTracker, NEW_STRINGS_KEY};
use chrono::Local;
use gettext_common::is_blank;
use gettext_config::{TranslatorConfig, DEFAULT_CACHE_EXPIRE_SECONDS, DEFAULT_NAMESPACE};
use indexmap::IndexMap;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can translate a message for a quantity
pub trait Translator {
    /// Resolves `message` for `form` and interpolates `args` into the result.
    fn translate(&mut self, message: &str, form: Form, args: &[FormatArg]) -> CatalogResult<String>;
}

/// Quantity a message is translated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    /// A bare count
    Count(u64),
    /// A count with the untranslated plural to fall back to
    Plural {
        /// Plural original
        plural: String,
        /// Quantity
        count: u64,
    },
}

impl Default for Form {
    fn default() -> Self {
        Self::Count(1)
    }
}

impl From<u64> for Form {
    fn from(count: u64) -> Self {
        Self::Count(count)
    }
}

impl<S: Into<String>> From<(S, u64)> for Form {
    fn from((plural, count): (S, u64)) -> Self {
        Self::Plural {
            plural: plural.into(),
            count,
        }
    }
}

impl Form {
    /// Coerces free text to a count; anything that is not a non-negative
    /// integer counts as 1.
    pub fn parse(text: &str) -> Self {
        Self::Count(text.trim().parse().unwrap_or(1))
    }

    /// The quantity.
    pub const fn count(&self) -> u64 {
        match self {
            Self::Count(count) | Self::Plural { count, .. } => *count,
        }
    }

    /// The plural original, when one was supplied.
    pub fn plural(&self) -> Option<&str> {
        match self {
            Self::Count(_) => None,
            Self::Plural { plural, .. } => Some(plural.as_str()).filter(|p| !p.is_empty()),
        }
    }
}

/// Translation or pending marker for one original; `None` means untranslated.
pub type StringMap = IndexMap<String, Option<Vec<String>>>;

/// Result of [`GettextTranslator::strings_by_file`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StringTable {
    /// Pending and translated strings of a single source
    File(StringMap),
    /// `newStrings` followed by one table per registered source
    Grouped(IndexMap<String, StringMap>),
}

/// Injected session, cache and response collaborators
#[derive(Debug, Clone)]
pub struct Collaborators {
    /// Store for pending untranslated strings
    pub session: Arc<dyn SessionStore>,
    /// Store for cached dictionaries
    pub cache: Arc<dyn CacheStore>,
    /// Response state consulted when no session is available
    pub response: Arc<dyn ResponseSignal>,
}

impl Collaborators {
    /// Process-local stores and a response that is never sent.
    pub fn in_memory() -> Self {
        Self {
            session: Arc::new(MemorySessionStore::new()),
            cache: Arc::new(MemoryCacheStore::new()),
            response: Arc::new(NeverSent),
        }
    }
}

/// Gettext translator backed by MO catalogs
#[derive(Debug)]
pub struct GettextTranslator {
    files: IndexMap<String, PathBuf>,
    lang: Option<String>,
    dictionary: Dictionary,
    loaded: bool,
    production_mode: bool,
    tracker: UntranslatedTracker,
    cache: CacheManager,
}

impl GettextTranslator {
    /// Creates a translator with no sources and no language.
    pub fn new(collaborators: Collaborators, namespace: &str, cache_expire: Duration) -> Self {
        Self {
            files: IndexMap::new(),
            lang: None,
            dictionary: Dictionary::new(),
            loaded: false,
            production_mode: false,
            tracker: UntranslatedTracker::new(
                collaborators.session,
                collaborators.response,
                namespace,
            ),
            cache: CacheManager::new(collaborators.cache, namespace, cache_expire),
        }
    }

    /// Creates a translator with the default namespace and cache lifetime.
    pub fn with_defaults(collaborators: Collaborators) -> Self {
        Self::new(
            collaborators,
            DEFAULT_NAMESPACE,
            Duration::from_secs(DEFAULT_CACHE_EXPIRE_SECONDS),
        )
    }

    /// Builds a translator from configuration: language, production mode
    /// and every configured source in order.
    pub fn from_config(config: &TranslatorConfig, collaborators: Collaborators) -> CatalogResult<Self> {
        let mut translator = Self::new(
            collaborators,
            &config.namespace,
            Duration::from_secs(config.cache.expire_seconds),
        );
        translator.set_lang(&config.lang)?;
        translator.set_production_mode(config.production_mode);
        for (identifier, dir) in &config.files {
            translator.add_file(dir, identifier)?;
        }
        Ok(translator)
    }

    /// Registers a catalog source directory under `identifier`.
    pub fn add_file(&mut self, dir: impl AsRef<Path>, identifier: &str) -> CatalogResult<&mut Self> {
        let dir = dir.as_ref();
        if self.files.contains_key(identifier) {
            return Err(CatalogError::DuplicateIdentifier(identifier.to_string()));
        }
        if !dir.is_dir() {
            return Err(CatalogError::MissingDirectory(dir.to_path_buf()));
        }

        debug!("Registered source '{}' at {:?}", identifier, dir);
        self.files.insert(identifier.to_string(), dir.to_path_buf());
        Ok(self)
    }

    /// The active language.
    pub fn lang(&self) -> CatalogResult<&str> {
        self.lang
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .ok_or(CatalogError::UndefinedLanguage)
    }

    /// Switches the active language, dropping the loaded dictionary.
    ///
    /// Setting the current language again changes nothing.
    pub fn set_lang(&mut self, lang: &str) -> CatalogResult<&mut Self> {
        if is_blank(lang) {
            return Err(CatalogError::EmptyLanguage);
        }
        if self.lang.as_deref() == Some(lang) {
            return Ok(self);
        }

        self.lang = Some(lang.to_string());
        self.dictionary.clear();
        self.loaded = false;
        Ok(self)
    }

    /// Enables or disables the dictionary cache.
    pub fn set_production_mode(&mut self, production_mode: bool) -> &mut Self {
        self.production_mode = production_mode;
        self
    }

    /// Whether the dictionary cache is used.
    pub const fn is_production_mode(&self) -> bool {
        self.production_mode
    }

    /// Whether the dictionary of the active language is loaded.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The loaded dictionary, possibly empty.
    pub const fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The untranslated-string tracker.
    pub const fn tracker(&self) -> &UntranslatedTracker {
        &self.tracker
    }

    /// Registered sources in registration order.
    pub fn files(&mut self) -> CatalogResult<&IndexMap<String, PathBuf>> {
        self.ensure_loaded()?;
        Ok(&self.files)
    }

    /// Loads the dictionary of the active language unless already loaded.
    ///
    /// In production mode a cached dictionary is used when present;
    /// otherwise every registered source is parsed. Sources without a file
    /// for the language are skipped.
    pub fn ensure_loaded(&mut self) -> CatalogResult<()> {
        if self.loaded {
            return Ok(());
        }
        if self.files.is_empty() {
            return Err(CatalogError::SourcesUndefined);
        }
        let lang = self.lang()?.to_string();

        if self.production_mode {
            if let Some(dictionary) = self.cache.get(&lang) {
                self.dictionary = dictionary;
                self.loaded = true;
                return Ok(());
            }
        }

        let mut dictionary = Dictionary::new();
        let mut paths = Vec::new();
        for (identifier, dir) in &self.files {
            let path = CatalogLoader::catalog_path(dir, &lang, identifier);
            if !path.is_file() {
                debug!("No catalog for '{}' at {:?}, skipping", identifier, path);
                continue;
            }
            dictionary.merge(CatalogLoader::load_file(&path, identifier)?);
            paths.push(path);
        }

        info!(
            "Loaded {} translations for '{}' from {} of {} sources",
            dictionary.len(),
            lang,
            paths.len(),
            self.files.len()
        );

        if self.production_mode {
            self.cache.put(&lang, &dictionary, paths);
        }

        self.dictionary = dictionary;
        self.loaded = true;
        Ok(())
    }

    /// Resolves `message` without interpolation.
    ///
    /// A miss is recorded as untranslated and answered with the supplied
    /// plural when the count exceeds one, else with the message itself.
    pub fn lookup(&mut self, message: &str, form: &Form) -> CatalogResult<String> {
        self.ensure_loaded()?;
        let count = form.count();

        if let Some(entry) = self.dictionary.get(message).filter(|_| !message.is_empty()) {
            let index = self.plural_index(entry, count);
            return Ok(entry.variant(index).to_string());
        }

        let lang = self.lang()?.to_string();
        self.tracker.record(&lang, message, form.plural())?;

        Ok(match form.plural() {
            Some(plural) if count > 1 => plural.to_string(),
            _ => message.to_string(),
        })
    }

    fn plural_index(&self, entry: &CatalogEntry, count: u64) -> usize {
        let fallback = usize::from(count > 1);
        let Some(header) = self
            .dictionary
            .metadata(&entry.source)
            .and_then(|metadata| metadata.plural_forms())
        else {
            return fallback;
        };

        plural::evaluate(header, count).unwrap_or_else(|e| {
            warn!(
                "Plural-Forms of source '{}' failed for n={}: {}",
                entry.source, count, e
            );
            fallback
        })
    }

    /// Translates a singular message.
    pub fn gettext(&mut self, message: &str) -> CatalogResult<String> {
        self.lookup(message, &Form::default())
    }

    /// Translates a message with a plural for `count`.
    pub fn ngettext(&mut self, singular: &str, plural: &str, count: u64) -> CatalogResult<String> {
        self.lookup(singular, &Form::from((plural, count)))
    }

    /// Inserts or replaces the translation of `message` in `source`.
    ///
    /// When `message` is pending, its recorded forms (including any plural)
    /// become the entry's original.
    pub fn set_translation(
        &mut self,
        message: &str,
        translation: Vec<String>,
        source: &str,
    ) -> CatalogResult<()> {
        self.ensure_loaded()?;
        let lang = self.lang()?.to_string();

        let original = self
            .tracker
            .get(&lang, message)?
            .unwrap_or_else(|| vec![message.to_string()]);
        self.dictionary
            .insert(CatalogEntry::new(original, translation, source));
        Ok(())
    }

    /// Number of plural forms declared by the first registered source, 1 when unknown.
    pub fn variants_count(&mut self) -> CatalogResult<usize> {
        self.ensure_loaded()?;
        Ok(self
            .files
            .keys()
            .next()
            .and_then(|first| self.dictionary.metadata(first))
            .and_then(|metadata| metadata.plural_forms())
            .and_then(plural::declared_nplurals)
            .unwrap_or(1))
    }

    /// Pending and translated strings.
    ///
    /// For a single `file`, pending originals come first and a translation
    /// replaces the pending marker of the same original in place. Without a
    /// file, `newStrings` is followed by a table for every registered
    /// source, empty ones included.
    pub fn strings_by_file(&mut self, file: Option<&str>) -> CatalogResult<StringTable> {
        self.ensure_loaded()?;
        let lang = self.lang()?.to_string();

        let pending: StringMap = self
            .tracker
            .pending(&lang)?
            .into_keys()
            .map(|original| (original, None))
            .collect();

        let translated = self
            .dictionary
            .entries()
            .filter(|entry| !is_blank(entry.key()));

        if let Some(file) = file {
            let mut table = pending;
            for entry in translated.filter(|entry| entry.source == file) {
                table.insert(entry.key().to_string(), Some(entry.translation.clone()));
            }
            return Ok(StringTable::File(table));
        }

        let mut grouped: IndexMap<String, StringMap> = IndexMap::new();
        grouped.insert(NEW_STRINGS_KEY.to_string(), pending);
        for identifier in self.files.keys() {
            grouped.entry(identifier.clone()).or_default();
        }
        for entry in translated {
            grouped
                .entry(entry.source.clone())
                .or_default()
                .insert(entry.key().to_string(), Some(entry.translation.clone()));
        }
        Ok(StringTable::Grouped(grouped))
    }

    /// Writes `source` back as `{dir}/{lang}.{source}.mo` and `.po`.
    ///
    /// Afterwards the pending strings of the language are cleared and, in
    /// production mode, its cached dictionary is dropped.
    pub fn save(&mut self, source: &str) -> CatalogResult<(PathBuf, PathBuf)> {
        if !self.loaded {
            return Err(CatalogError::DictionaryNotLoaded);
        }
        let dir = self
            .files
            .get(source)
            .ok_or_else(|| CatalogError::UnknownSource(source.to_string()))?
            .clone();
        let lang = self.lang()?.to_string();
        let now = Local::now();

        let metadata = self.dictionary.metadata(source);
        let pending: Vec<Vec<String>> = self
            .tracker
            .pending(&lang)?
            .into_values()
            .filter(|forms| {
                forms
                    .first()
                    .is_some_and(|original| !self.dictionary.contains(original))
            })
            .collect();

        let mo = build_mo(&self.dictionary.sorted_entries_for(source), metadata, &now)?;
        let entries: Vec<&CatalogEntry> = self.dictionary.entries_for(source).collect();
        let po = build_po(&entries, metadata, &pending, &now);

        let mo_path = CatalogLoader::catalog_path(&dir, &lang, source);
        let po_path = mo_path.with_extension("po");
        write_atomically(&mo_path, &mo)?;
        write_atomically(&po_path, po.as_bytes())?;
        info!(
            "Saved {} translations of '{}' to {:?} and {:?}",
            entries.len(),
            source,
            mo_path,
            po_path
        );

        self.tracker.clear(&lang)?;
        if self.production_mode {
            self.cache.invalidate(&lang);
        }

        Ok((mo_path, po_path))
    }
}

impl Translator for GettextTranslator {
    fn translate(&mut self, message: &str, form: Form, args: &[FormatArg]) -> CatalogResult<String> {
        let resolved = self.lookup(message, &form)?;
        Ok(interpolate(&resolved, args)?)
    }
}

/// Replaces `path` with `contents` through a temporary file in the same directory.
fn write_atomically(path: &Path, contents: &[u8]) -> CatalogResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
