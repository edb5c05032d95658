//! MO and PO export of one source's entries
//!
//! Both builders are pure: they take the entries, the source's metadata and
//! the export timestamp, and return the file contents. Given the same inputs
//! the output is byte-for-byte identical.

use crate::dictionary::CatalogEntry;
use crate::error::{CatalogError, CatalogResult};
use crate::loader::{HEADER_SIZE, MO_MAGIC};
use crate::metadata::Metadata;
use chrono::{DateTime, TimeZone};
use gettext_common::{format_created_timestamp, is_blank};
use std::fmt::Display;
use std::fmt::Write as _;

/// First line of every exported PO file.
pub const PO_BANNER: &str = "# Gettext keys exported by GettextTranslator and Translation Panel";

/// Builds a little-endian MO file.
///
/// Entries are sorted by key bytes. The header pseudo-entry (empty original,
/// metadata text) comes first, so the file holds `entries.len() + 1` pairs.
/// No hash table is written.
pub fn build_mo<Tz>(
    entries: &[&CatalogEntry],
    metadata: Option<&Metadata>,
    revised_at: &DateTime<Tz>,
) -> CatalogResult<Vec<u8>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| a.key().cmp(b.key()));

    let header_text = header_lines(metadata, revised_at).join("\n");
    let items = entries.len() + 1;
    let strings_start = HEADER_SIZE + items * 16;

    let mut ids: Vec<u8> = vec![0];
    let mut strings: Vec<u8> = header_text.as_bytes().to_vec();
    strings.push(0);

    // (length, offset) pairs; translation offsets are relative until the ids blob is complete
    let mut id_slots = vec![(0, strings_start)];
    let mut string_slots = vec![(header_text.len(), 0)];

    for entry in &entries {
        let mut id = entry.key().as_bytes().to_vec();
        if let Some(plural) = entry.plural_original() {
            id.push(0);
            id.extend_from_slice(plural.as_bytes());
        }
        let string = entry.translation.join("\0");

        id_slots.push((id.len(), strings_start + ids.len()));
        string_slots.push((string.len(), strings.len()));

        ids.extend_from_slice(&id);
        ids.push(0);
        strings.extend_from_slice(string.as_bytes());
        strings.push(0);
    }

    let translations_start = strings_start + ids.len();
    let mut mo = Vec::with_capacity(translations_start + strings.len());

    let header = [
        MO_MAGIC,
        0,
        word(items)?,
        word(HEADER_SIZE)?,
        word(HEADER_SIZE + items * 8)?,
        0,
        word(strings_start)?,
    ];
    for value in header {
        mo.extend_from_slice(&value.to_le_bytes());
    }

    for (length, offset) in id_slots {
        mo.extend_from_slice(&word(length)?.to_le_bytes());
        mo.extend_from_slice(&word(offset)?.to_le_bytes());
    }
    for (length, relative) in string_slots {
        mo.extend_from_slice(&word(length)?.to_le_bytes());
        mo.extend_from_slice(&word(translations_start + relative)?.to_le_bytes());
    }

    mo.extend_from_slice(&ids);
    mo.extend_from_slice(&strings);
    Ok(mo)
}

/// Builds the PO text of one source.
///
/// `pending` holds the candidate forms (`[singular]` or `[singular, plural]`)
/// of untranslated strings; the caller removes those already in the
/// dictionary. They are appended with empty `msgstr` lines.
pub fn build_po<Tz>(
    entries: &[&CatalogEntry],
    metadata: Option<&Metadata>,
    pending: &[Vec<String>],
    now: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut po = String::new();
    let _ = writeln!(po, "{PO_BANNER}");
    let _ = writeln!(po, "# Created: {}", format_created_timestamp(now));
    po.push_str("msgid \"\"\nmsgstr \"\"\n");

    for line in header_lines(metadata, now) {
        let _ = writeln!(po, "\"{}\\n\"", escape(&line));
    }
    po.push_str("\n\n");

    for entry in entries {
        let _ = writeln!(po, "msgid \"{}\"", escape(entry.key()));
        if let Some(plural) = entry.plural_original() {
            let _ = writeln!(po, "msgid_plural \"{}\"", escape(plural));
        }

        if entry.translation.len() < 2 {
            let single = entry.translation.first().map_or("", String::as_str);
            let _ = writeln!(po, "msgstr \"{}\"", escape(single));
        } else {
            for (index, variant) in entry.translation.iter().enumerate() {
                let _ = writeln!(po, "msgstr[{index}] \"{}\"", escape(variant));
            }
        }
        po.push('\n');
    }

    for forms in pending {
        let Some(singular) = forms.first() else {
            continue;
        };
        if is_blank(singular) {
            continue;
        }

        let _ = writeln!(po, "msgid \"{}\"", escape(singular));
        if forms.len() > 1 {
            if let Some(plural) = forms.last() {
                let _ = writeln!(po, "msgid_plural \"{}\"", escape(plural));
            }
        }
        po.push_str("msgstr \"\"\n\n");
    }

    po
}

/// Backslash-escapes double quotes; nothing else is escaped.
pub fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}

fn header_lines<Tz>(metadata: Option<&Metadata>, revised_at: &DateTime<Tz>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    metadata.map_or_else(
        || Metadata::default_header_lines(revised_at),
        |metadata| metadata.header_lines(revised_at),
    )
}

fn word(value: usize) -> CatalogResult<u32> {
    u32::try_from(value)
        .map_err(|_| CatalogError::invalid_format("catalog exceeds the 4 GiB MO limit"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::CatalogLoader;
    use chrono::Utc;

    fn revised() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap()
    }

    fn read_word(bytes: &[u8], offset: usize) -> usize {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()) as usize
    }

    #[test]
    fn test_empty_catalog_layout() {
        let mo = build_mo(&[], None, &revised()).unwrap();
        assert_eq!(read_word(&mo, 0), MO_MAGIC as usize);
        assert_eq!(read_word(&mo, 4), 0);
        assert_eq!(read_word(&mo, 8), 1);
        assert_eq!(read_word(&mo, 12), 28);
        assert_eq!(read_word(&mo, 16), 36);
        assert_eq!(read_word(&mo, 20), 0);
        assert_eq!(read_word(&mo, 24), 44);
        // empty original: length 0 at the start of the ids blob
        assert_eq!(read_word(&mo, 28), 0);
        assert_eq!(read_word(&mo, 32), 44);
        // metadata translation begins right after the single NUL of the ids blob
        assert_eq!(read_word(&mo, 40), 45);
        assert_eq!(mo[44], 0);
    }

    #[test]
    fn test_offsets_follow_sorted_entries() {
        let b = CatalogEntry::singular("b", "B", "default");
        let a = CatalogEntry::new(
            vec!["a".into(), "as".into()],
            vec!["x".into(), "y".into()],
            "default",
        );
        let mo = build_mo(&[&b, &a], None, &revised()).unwrap();

        let items = read_word(&mo, 8);
        assert_eq!(items, 3);
        let strings_start = 28 + items * 16;

        // originals table: "", "a\0as", "b"
        assert_eq!(read_word(&mo, 36), 4);
        assert_eq!(read_word(&mo, 40), strings_start + 1);
        assert_eq!(&mo[strings_start + 1..strings_start + 5], b"a\0as");
        assert_eq!(read_word(&mo, 44), 1);
        assert_eq!(read_word(&mo, 48), strings_start + 6);

        // translations table entry for "a" is both variants joined by NUL
        let length = read_word(&mo, 28 + items * 8 + 8);
        let offset = read_word(&mo, 28 + items * 8 + 12);
        assert_eq!(&mo[offset..offset + length], b"x\0y");
    }

    #[test]
    fn test_mo_is_readable_by_loader() {
        let mut metadata = Metadata::new();
        metadata.insert("Plural-Forms", "nplurals=2; plural=(n != 1);");
        let entry = CatalogEntry::new(
            vec!["Cat".into(), "Cats".into()],
            vec!["Kočka".into(), "Kočky".into()],
            "default",
        );

        let mo = build_mo(&[&entry], Some(&metadata), &revised()).unwrap();
        let parsed = CatalogLoader::parse(&mo, "default").unwrap();
        assert_eq!(parsed.entries, [entry]);
        let parsed_metadata = parsed.metadata.unwrap();
        assert_eq!(
            parsed_metadata.plural_forms(),
            Some("nplurals=2; plural=(n != 1);")
        );
        assert_eq!(
            parsed_metadata.get("PO-Revision-Date"),
            Some("2024-03-01 09:30+0000")
        );
    }

    #[test]
    fn test_po_layout() {
        let mut metadata = Metadata::new();
        metadata.insert("Plural-Forms", "nplurals=2; plural=(n != 1);");
        let hello = CatalogEntry::singular("Say \"hi\"", "Řekni \"ahoj\"", "default");
        let cat = CatalogEntry::new(
            vec!["Cat".into(), "Cats".into()],
            vec!["Kočka".into(), "Kočky".into()],
            "default",
        );
        let pending = vec![
            vec!["Dog".to_string(), "Dogs".to_string()],
            vec!["   ".to_string()],
            vec!["Bird".to_string()],
        ];

        let po = build_po(&[&hello, &cat], Some(&metadata), &pending, &revised());
        let expected = "\
# Gettext keys exported by GettextTranslator and Translation Panel
# Created: 2024-03-01 09:30:15
msgid \"\"
msgstr \"\"
\"PO-Revision-Date: 2024-03-01 09:30+0000\\n\"
\"MIME-Version: 1.0\\n\"
\"Content-Type: text/plain; charset=UTF-8\\n\"
\"Content-Transfer-Encoding: 8bit\\n\"
\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"


msgid \"Say \\\"hi\\\"\"
msgstr \"Řekni \\\"ahoj\\\"\"

msgid \"Cat\"
msgid_plural \"Cats\"
msgstr[0] \"Kočka\"
msgstr[1] \"Kočky\"

msgid \"Dog\"
msgid_plural \"Dogs\"
msgstr \"\"

msgid \"Bird\"
msgstr \"\"

";
        assert_eq!(po, expected);
    }

    #[test]
    fn test_empty_translation_renders_single_msgstr() {
        let entry = CatalogEntry::new(vec!["Empty".into()], Vec::new(), "default");
        let po = build_po(&[&entry], None, &[], &revised());
        assert!(po.contains("msgid \"Empty\"\nmsgstr \"\"\n"));
    }

    #[test]
    fn test_escape_only_touches_quotes() {
        assert_eq!(escape("a \"b\" \\ \n"), "a \\\"b\\\" \\ \n");
    }
}
