//! Binary MO catalog loading
//!
//! Layout: a 28-byte header of seven 32-bit words
//! (`magic, revision, count, originals, translations, hash size, hash offset`),
//! followed by two tables of `count` `(length, offset)` pairs addressing the
//! original and translated strings. The magic `0x950412de` read little-endian
//! selects little-endian words; its byte-reversed form selects big-endian.

use crate::dictionary::CatalogEntry;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::Metadata;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic number of a little-endian catalog.
pub const MO_MAGIC: u32 = 0x9504_12de;

/// The magic number as seen when a big-endian catalog is read little-endian.
pub const MO_MAGIC_SWAPPED: u32 = 0xde12_0495;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 28;

/// Byte order of the 32-bit words in a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian words
    Little,
    /// Big-endian words
    Big,
}

/// The fixed MO header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoHeader {
    /// Word order detected from the magic number
    pub byte_order: ByteOrder,
    /// File format revision
    pub revision: u32,
    /// Number of string pairs
    pub count: u32,
    /// Offset of the originals table
    pub originals_offset: u32,
    /// Offset of the translations table
    pub translations_offset: u32,
    /// Size of the hash table
    pub hash_size: u32,
    /// Offset of the hash table
    pub hash_offset: u32,
}

/// Entries and metadata parsed from one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    /// Source identifier the entries are attributed to
    pub source: String,
    /// Translatable entries in file order
    pub entries: Vec<CatalogEntry>,
    /// Header metadata, when the file has one
    pub metadata: Option<Metadata>,
}

/// MO catalog parser
#[derive(Debug)]
pub struct CatalogLoader;

impl CatalogLoader {
    /// Path of a source's catalog for a language: `{dir}/{lang}.{identifier}.mo`.
    pub fn catalog_path(dir: &Path, lang: &str, identifier: &str) -> PathBuf {
        dir.join(format!("{lang}.{identifier}.mo"))
    }

    /// Reads and parses a catalog file.
    pub fn load_file(path: &Path, source: &str) -> CatalogResult<ParsedCatalog> {
        debug!("Loading catalog file: {:?}", path);
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes, source).map_err(|e| e.with_path(path))
    }

    /// Parses the fixed header.
    pub fn parse_header(bytes: &[u8]) -> CatalogResult<MoHeader> {
        if bytes.len() < HEADER_SIZE {
            return Err(CatalogError::invalid_format(format!(
                "file is {} bytes, shorter than the {HEADER_SIZE}-byte header",
                bytes.len()
            )));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let byte_order = match magic {
            MO_MAGIC => ByteOrder::Little,
            MO_MAGIC_SWAPPED => ByteOrder::Big,
            other => {
                return Err(CatalogError::invalid_format(format!(
                    "bad magic number {other:#010x}"
                )))
            }
        };

        let reader = Reader { bytes, byte_order };
        Ok(MoHeader {
            byte_order,
            revision: reader.word(4)?,
            count: reader.word(8)?,
            originals_offset: reader.word(12)?,
            translations_offset: reader.word(16)?,
            hash_size: reader.word(20)?,
            hash_offset: reader.word(24)?,
        })
    }

    /// Parses catalog bytes into a batch of entries attributed to `source`.
    ///
    /// The record with an empty original carries the header metadata and is
    /// not returned as an entry. Records with an empty translation are skipped.
    pub fn parse(bytes: &[u8], source: &str) -> CatalogResult<ParsedCatalog> {
        let header = Self::parse_header(bytes)?;
        let reader = Reader {
            bytes,
            byte_order: header.byte_order,
        };

        let mut catalog = ParsedCatalog {
            source: source.to_string(),
            ..ParsedCatalog::default()
        };

        for index in 0..header.count {
            let original = reader.table_string(header.originals_offset, index)?;
            let translation = reader.table_string(header.translations_offset, index)?;

            if translation.is_empty() {
                continue;
            }

            if original.is_empty() {
                catalog
                    .metadata
                    .get_or_insert_with(Metadata::new)
                    .merge_text(&String::from_utf8_lossy(translation));
                continue;
            }

            catalog.entries.push(CatalogEntry::new(
                split_nul(original),
                split_nul(translation),
                source,
            ));
        }

        debug!(
            "Parsed {} entries for source '{}' ({:?}, revision {})",
            catalog.entries.len(),
            source,
            header.byte_order,
            header.revision
        );
        Ok(catalog)
    }
}

fn split_nul(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split('\0')
        .map(str::to_string)
        .collect()
}

struct Reader<'a> {
    bytes: &'a [u8],
    byte_order: ByteOrder,
}

impl<'a> Reader<'a> {
    fn word(&self, offset: usize) -> CatalogResult<u32> {
        let end = offset
            .checked_add(4)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                CatalogError::invalid_format(format!("word at offset {offset} is out of bounds"))
            })?;

        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[offset..end]);
        Ok(match self.byte_order {
            ByteOrder::Little => u32::from_le_bytes(word),
            ByteOrder::Big => u32::from_be_bytes(word),
        })
    }

    /// String addressed by the `index`-th `(length, offset)` pair of a table.
    fn table_string(&self, table: u32, index: u32) -> CatalogResult<&'a [u8]> {
        let slot = to_usize(table)
            .checked_add(to_usize(index) * 8)
            .ok_or_else(|| CatalogError::invalid_format("string table offset overflows"))?;
        let length = to_usize(self.word(slot)?);
        let offset = to_usize(self.word(slot + 4)?);

        if length == 0 {
            return Ok(&[]);
        }

        offset
            .checked_add(length)
            .filter(|end| *end <= self.bytes.len())
            .map(|end| &self.bytes[offset..end])
            .ok_or_else(|| {
                CatalogError::invalid_format(format!(
                    "string of {length} bytes at offset {offset} is out of bounds"
                ))
            })
    }
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
