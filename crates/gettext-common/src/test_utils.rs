//! Test utilities and shared test helpers for the gettext workspace.
//!
//! The [`MoFixture`] writer builds binary catalogs byte by byte so that
//! loader tests do not depend on the crate's own serializer, and can cover
//! the big-endian layout the serializer never emits.

use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Little-endian MO magic number.
pub const MO_MAGIC: u32 = 0x9504_12de;

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Byte order of a fixture file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Magic `0x950412de` stored little-endian
    Little,
    /// Magic stored big-endian, read back as `0xde120495`
    Big,
}

/// Hand-assembled MO catalog for loader tests.
#[derive(Debug, Clone)]
pub struct MoFixture {
    endianness: Endianness,
    records: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Default for MoFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl MoFixture {
    /// Creates an empty little-endian fixture.
    pub fn new() -> Self {
        Self {
            endianness: Endianness::Little,
            records: Vec::new(),
        }
    }

    /// Switches the fixture to big-endian encoding.
    #[must_use]
    pub fn big_endian(mut self) -> Self {
        self.endianness = Endianness::Big;
        self
    }

    /// Adds the header pseudo-entry (empty original).
    #[must_use]
    pub fn metadata(self, text: &str) -> Self {
        self.raw(b"", text.as_bytes())
    }

    /// Adds a singular entry.
    #[must_use]
    pub fn entry(self, original: &str, translation: &str) -> Self {
        self.raw(original.as_bytes(), translation.as_bytes())
    }

    /// Adds a plural entry; variants are joined with NUL.
    #[must_use]
    pub fn plural_entry(self, singular: &str, plural: &str, translations: &[&str]) -> Self {
        let original = format!("{singular}\0{plural}");
        let translation = translations.join("\0");
        self.raw(original.as_bytes(), translation.as_bytes())
    }

    /// Adds a record with arbitrary bytes.
    #[must_use]
    pub fn raw(mut self, original: &[u8], translation: &[u8]) -> Self {
        self.records.push((original.to_vec(), translation.to_vec()));
        self
    }

    /// Assembles the catalog bytes.
    pub fn build(&self) -> Vec<u8> {
        let count = self.records.len();
        let originals_table = 28;
        let translations_table = originals_table + count * 8;
        let strings_start = translations_table + count * 8;

        let mut blob = Vec::new();
        let mut original_slots = Vec::with_capacity(count);
        for (original, _) in &self.records {
            original_slots.push((original.len(), strings_start + blob.len()));
            blob.extend_from_slice(original);
            blob.push(0);
        }
        let mut translation_slots = Vec::with_capacity(count);
        for (_, translation) in &self.records {
            translation_slots.push((translation.len(), strings_start + blob.len()));
            blob.extend_from_slice(translation);
            blob.push(0);
        }

        let mut out = Vec::with_capacity(strings_start + blob.len());
        let header = [
            MO_MAGIC,
            0,
            to_u32(count),
            to_u32(originals_table),
            to_u32(translations_table),
            0,
            to_u32(strings_start),
        ];
        for word in header {
            self.push_word(&mut out, word);
        }
        for (length, offset) in original_slots.into_iter().chain(translation_slots) {
            self.push_word(&mut out, to_u32(length));
            self.push_word(&mut out, to_u32(offset));
        }
        out.extend_from_slice(&blob);
        out
    }

    /// Writes the catalog as `{dir}/{lang}.{identifier}.mo` and returns the path.
    pub fn write_to(&self, dir: &Path, lang: &str, identifier: &str) -> PathBuf {
        let path = dir.join(format!("{lang}.{identifier}.mo"));
        std::fs::write(&path, self.build()).expect("Failed to write MO fixture");
        path
    }

    fn push_word(&self, out: &mut Vec<u8>, word: u32) {
        match self.endianness {
            Endianness::Little => out.extend_from_slice(&word.to_le_bytes()),
            Endianness::Big => out.extend_from_slice(&word.to_be_bytes()),
        }
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).expect("fixture exceeds 4 GiB")
}
