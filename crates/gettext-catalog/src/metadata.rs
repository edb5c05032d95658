//! Catalog header metadata
//!
//! The header is stored as the translation of the empty original string. It
//! is a list of `Key: Value` lines; each source file carries its own set.

use chrono::{DateTime, TimeZone};
use gettext_common::format_revision_date;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Header key holding the plural formula.
pub const PLURAL_FORMS: &str = "Plural-Forms";

/// Header key regenerated on every export.
pub const PO_REVISION_DATE: &str = "PO-Revision-Date";

/// Header keys written on export, in output order, with their defaults.
pub const RECOGNIZED_METADATA: [(&str, Option<&str>); 13] = [
    ("Project-Id-Version", None),
    ("Report-Msgid-Bugs-To", None),
    ("POT-Creation-Date", None),
    ("Last-Translator", None),
    ("Language-Team", None),
    ("MIME-Version", Some("1.0")),
    ("Content-Type", Some("text/plain; charset=UTF-8")),
    ("Content-Transfer-Encoding", Some("8bit")),
    (
        PLURAL_FORMS,
        Some("nplurals=3; plural=((n==1) ? 0 : (n>=2 && n<=4 ? 1 : 2));"),
    ),
    ("X-Poedit-Language", None),
    ("X-Poedit-Country", None),
    ("X-Poedit-SourceCharset", None),
    ("X-Poedit-KeywordsList", None),
];

/// Header key/value pairs of one source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    values: IndexMap<String, String>,
}

impl Metadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a header blob.
    ///
    /// The blob is split on newlines and commas; every piece containing `": "`
    /// contributes one pair. Later duplicates overwrite earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut metadata = Self::new();
        metadata.merge_text(text);
        metadata
    }

    /// Parses a header blob into this set, overwriting existing keys.
    pub fn merge_text(&mut self, text: &str) {
        for line in text
            .trim()
            .split(['\n', ','])
            .filter(|line| !line.is_empty())
        {
            if let Some((key, value)) = line.split_once(": ") {
                self.values.insert(key.trim().to_string(), value.to_string());
            }
        }
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Sets `key` to `value`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// The raw `Plural-Forms` header, if present.
    pub fn plural_forms(&self) -> Option<&str> {
        self.get(PLURAL_FORMS)
    }

    /// Iterates over all pairs, including unrecognized keys.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no pairs were parsed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Header lines for export: a fresh revision date, every recognized key
    /// that is present or has a default, then the remaining parsed keys in
    /// their original order.
    pub fn header_lines<Tz>(&self, revised_at: &DateTime<Tz>) -> Vec<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut lines = Vec::with_capacity(RECOGNIZED_METADATA.len() + 1);
        lines.push(format!(
            "{PO_REVISION_DATE}: {}",
            format_revision_date(revised_at)
        ));

        for (key, default) in RECOGNIZED_METADATA {
            if let Some(value) = self.get(key).or(default) {
                lines.push(format!("{key}: {value}"));
            }
        }

        for (key, value) in self.iter() {
            let recognized = RECOGNIZED_METADATA.iter().any(|(known, _)| *known == key);
            if !recognized && key != PO_REVISION_DATE {
                lines.push(format!("{key}: {value}"));
            }
        }

        lines
    }

    /// Header lines for a source without parsed metadata.
    pub fn default_header_lines<Tz>(revised_at: &DateTime<Tz>) -> Vec<String>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self::new().header_lines(revised_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const HEADER: &str = "Project-Id-Version: demo 1.0\n\
        Content-Type: text/plain; charset=UTF-8\n\
        Plural-Forms: nplurals=2; plural=(n != 1);\n\
        X-Generator: Poedit 3.0\n";

    #[test]
    fn test_parse_header() {
        let metadata = Metadata::parse(HEADER);
        assert_eq!(metadata.get("Project-Id-Version"), Some("demo 1.0"));
        assert_eq!(
            metadata.plural_forms(),
            Some("nplurals=2; plural=(n != 1);")
        );
        assert_eq!(metadata.get("X-Generator"), Some("Poedit 3.0"));
        assert_eq!(metadata.len(), 4);
    }

    #[test]
    fn test_value_keeps_extra_colons() {
        let metadata = Metadata::parse("POT-Creation-Date: 2024-01-01 10:00: draft");
        assert_eq!(metadata.get("POT-Creation-Date"), Some("2024-01-01 10:00: draft"));
    }

    #[test]
    fn test_commas_split_lines() {
        let metadata = Metadata::parse("Language-Team: Czech, MIME-Version: 1.0");
        assert_eq!(metadata.get("Language-Team"), Some("Czech"));
        assert_eq!(metadata.get("MIME-Version"), Some("1.0"));
    }

    #[test]
    fn test_lines_without_separator_are_ignored() {
        let metadata = Metadata::parse("garbage\nLast-Translator: Jan");
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("Last-Translator"), Some("Jan"));
    }

    #[test]
    fn test_header_lines_keep_table_order_then_extra_keys() {
        let mut metadata = Metadata::new();
        metadata.insert("Language-Team", "Czech");
        metadata.insert("X-Generator", "Poedit 3.4");
        metadata.insert(PO_REVISION_DATE, "2001-01-01 00:00+0000");
        metadata.insert("Language", "cs");
        let revised = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 0).unwrap();

        let lines = metadata.header_lines(&revised);
        assert_eq!(
            lines,
            [
                "PO-Revision-Date: 2024-05-06 07:08+0000",
                "Language-Team: Czech",
                "MIME-Version: 1.0",
                "Content-Type: text/plain; charset=UTF-8",
                "Content-Transfer-Encoding: 8bit",
                "Plural-Forms: nplurals=3; plural=((n==1) ? 0 : (n>=2 && n<=4 ? 1 : 2));",
                "X-Generator: Poedit 3.4",
                "Language: cs",
            ]
        );
    }
}
