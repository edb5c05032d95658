//! Untranslated-string tracking
//!
//! Misses are kept in the session store under [`NEW_STRINGS_KEY`] as a map of
//! language to `original -> candidate forms`.

use crate::error::CatalogResult;
use crate::store::{ResponseSignal, SessionStore};
use gettext_common::is_blank;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Session key of the pending map; also the top-level key of `strings_by_file`.
pub const NEW_STRINGS_KEY: &str = "newStrings";

/// Pending originals of one language with their candidate forms
pub type PendingStrings = IndexMap<String, Vec<String>>;

type PendingByLanguage = IndexMap<String, PendingStrings>;

/// Records lookups that missed the dictionary
#[derive(Debug, Clone)]
pub struct UntranslatedTracker {
    session: Arc<dyn SessionStore>,
    response: Arc<dyn ResponseSignal>,
    namespace: String,
}

impl UntranslatedTracker {
    /// Creates a tracker persisting into `session` under `namespace`.
    pub fn new(
        session: Arc<dyn SessionStore>,
        response: Arc<dyn ResponseSignal>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            session,
            response,
            namespace: namespace.into(),
        }
    }

    /// Whether misses can currently be recorded: always with a session,
    /// otherwise only while the response is still open.
    pub fn can_record(&self) -> bool {
        self.session.is_available() || !self.response.is_sent()
    }

    /// Records a miss, replacing any earlier candidate for the same original.
    ///
    /// Blank originals are ignored.
    pub fn record(&self, lang: &str, original: &str, plural: Option<&str>) -> CatalogResult<()> {
        if is_blank(original) || !self.can_record() {
            return Ok(());
        }

        let mut forms = vec![original.to_string()];
        if let Some(plural) = plural {
            forms.push(plural.to_string());
        }

        let mut all = self.load_all()?;
        all.entry(lang.to_string())
            .or_default()
            .insert(original.to_string(), forms);
        debug!("Recorded untranslated string '{}' for '{}'", original, lang);
        self.store_all(&all)
    }

    /// Pending originals of `lang` in recording order.
    pub fn pending(&self, lang: &str) -> CatalogResult<PendingStrings> {
        let mut pending = self.load_all()?.shift_remove(lang).unwrap_or_default();
        pending.retain(|original, _| !is_blank(original));
        Ok(pending)
    }

    /// Candidate forms recorded for `original`.
    pub fn get(&self, lang: &str, original: &str) -> CatalogResult<Option<Vec<String>>> {
        Ok(self.pending(lang)?.shift_remove(original))
    }

    /// Forgets every pending original of `lang`.
    pub fn clear(&self, lang: &str) -> CatalogResult<()> {
        let mut all = self.load_all()?;
        if all.shift_remove(lang).is_some() {
            self.store_all(&all)?;
        }
        Ok(())
    }

    fn load_all(&self) -> CatalogResult<PendingByLanguage> {
        match self.session.load(&self.namespace, NEW_STRINGS_KEY) {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(PendingByLanguage::new()),
        }
    }

    fn store_all(&self, all: &PendingByLanguage) -> CatalogResult<()> {
        self.session
            .store(&self.namespace, NEW_STRINGS_KEY, serde_json::to_value(all)?);
        Ok(())
    }
}
