//! In-memory translation dictionary for one language

use crate::loader::ParsedCatalog;
use crate::metadata::Metadata;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One translatable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// `[singular]` or `[singular, plural-id]`
    pub original: Vec<String>,
    /// Translation variants indexed by plural form
    pub translation: Vec<String>,
    /// Identifier of the source file the entry belongs to
    pub source: String,
}

impl CatalogEntry {
    /// Creates an entry.
    pub fn new(original: Vec<String>, translation: Vec<String>, source: impl Into<String>) -> Self {
        Self {
            original,
            translation,
            source: source.into(),
        }
    }

    /// Creates a singular entry with a single translation.
    pub fn singular(original: &str, translation: &str, source: impl Into<String>) -> Self {
        Self::new(
            vec![original.to_string()],
            vec![translation.to_string()],
            source,
        )
    }

    /// The dictionary key: the singular original.
    pub fn key(&self) -> &str {
        self.original.first().map_or("", String::as_str)
    }

    /// The plural id, when the original carries one.
    pub fn plural_original(&self) -> Option<&str> {
        if self.original.len() > 1 {
            self.original.last().map(String::as_str)
        } else {
            None
        }
    }

    /// Variant at `index`, falling back to the first variant.
    pub fn variant(&self, index: usize) -> &str {
        self.translation
            .get(index)
            .or_else(|| self.translation.first())
            .map_or("", String::as_str)
    }
}

/// Entries and per-source metadata for the active language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    entries: IndexMap<String, CatalogEntry>,
    metadata: IndexMap<String, Metadata>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one parsed source file. Entries with a key already present are
    /// replaced in place.
    pub fn merge(&mut self, catalog: ParsedCatalog) {
        if let Some(metadata) = catalog.metadata {
            let target = self.metadata.entry(catalog.source).or_default();
            for (key, value) in metadata.iter() {
                target.insert(key, value);
            }
        }

        for entry in catalog.entries {
            self.insert(entry);
        }
    }

    /// Inserts or replaces an entry under its singular original.
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.key().to_string(), entry);
    }

    /// Entry for `key`.
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    /// Whether `key` has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries of one source in insertion order.
    pub fn entries_for<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a CatalogEntry> {
        self.entries.values().filter(move |entry| entry.source == source)
    }

    /// Entries of one source ordered by key bytes, as MO files require.
    pub fn sorted_entries_for<'a>(&'a self, source: &'a str) -> Vec<&'a CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.entries_for(source).collect();
        entries.sort_by(|a, b| a.key().cmp(b.key()));
        entries
    }

    /// Metadata parsed for `source`.
    pub fn metadata(&self, source: &str) -> Option<&Metadata> {
        self.metadata.get(source)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops all entries and metadata.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.metadata.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(source: &str, entries: Vec<CatalogEntry>, header: Option<&str>) -> ParsedCatalog {
        ParsedCatalog {
            source: source.to_string(),
            entries,
            metadata: header.map(Metadata::parse),
        }
    }

    #[test]
    fn test_variant_falls_back_to_first() {
        let entry = CatalogEntry::new(
            vec!["Cat".into(), "Cats".into()],
            vec!["Kočka".into(), "Kočky".into()],
            "default",
        );
        assert_eq!(entry.key(), "Cat");
        assert_eq!(entry.plural_original(), Some("Cats"));
        assert_eq!(entry.variant(1), "Kočky");
        assert_eq!(entry.variant(7), "Kočka");
    }

    #[test]
    fn test_merge_later_source_wins_in_place() {
        let mut dictionary = Dictionary::new();
        dictionary.merge(parsed(
            "default",
            vec![
                CatalogEntry::singular("Yes", "Ano", "default"),
                CatalogEntry::singular("No", "Ne", "default"),
            ],
            Some("Plural-Forms: nplurals=2; plural=(n != 1);"),
        ));
        dictionary.merge(parsed(
            "admin",
            vec![CatalogEntry::singular("Yes", "Jo", "admin")],
            None,
        ));

        let keys: Vec<&str> = dictionary.entries().map(CatalogEntry::key).collect();
        assert_eq!(keys, ["Yes", "No"]);
        assert_eq!(dictionary.get("Yes").unwrap().source, "admin");
        assert!(dictionary.metadata("default").is_some());
        assert!(dictionary.metadata("admin").is_none());
    }

    #[test]
    fn test_sorted_entries_use_byte_order() {
        let mut dictionary = Dictionary::new();
        for key in ["b", "B", "a", "Á"] {
            dictionary.insert(CatalogEntry::singular(key, key, "default"));
        }
        dictionary.insert(CatalogEntry::singular("0", "0", "other"));

        let keys: Vec<&str> = dictionary
            .sorted_entries_for("default")
            .into_iter()
            .map(CatalogEntry::key)
            .collect();
        assert_eq!(keys, ["B", "a", "b", "Á"]);
    }
}
