//! In-memory DOCX package
//!
//! A package is the decoded ZIP archive: an ordered list of entries keyed by
//! their internal path. Parts are edited by swapping their bytes in place, so
//! entry order and compression survive a decode/encode cycle.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::relationships::{resolve_target, Relationships, TargetMode};
use crate::docx::{relationship_types, CONTENT_TYPES_PART, DOCUMENT_RELS_PART, MAIN_DOCUMENT_PART};
use std::collections::BTreeMap;

/// How an entry is stored inside the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryCompression {
    /// Stored without compression
    Stored,
    /// Deflate-compressed (what Word writes for XML parts)
    #[default]
    Deflated,
}

/// Kind of a secondary part attached to the main document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFooterKind {
    Header,
    Footer,
}

impl HeaderFooterKind {
    fn from_file_name(name: &str) -> Option<Self> {
        let file = name.strip_prefix("word/")?;
        if file.contains('/') || !file.ends_with(".xml") {
            return None;
        }
        if file.starts_with("header") {
            Some(Self::Header)
        } else if file.starts_with("footer") {
            Some(Self::Footer)
        } else {
            None
        }
    }
}

/// A header or footer part found in the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFooterPart {
    pub path: String,
    pub kind: HeaderFooterKind,
}

/// A single entry of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Internal path, e.g. `word/document.xml`
    pub name: String,
    /// Raw (uncompressed) content
    pub data: Vec<u8>,
    /// Compression used when the entry is written back
    pub compression: EntryCompression,
    /// Directory entries carry no data
    pub is_dir: bool,
}

impl PackageEntry {
    /// Create a file entry
    pub fn file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            compression: EntryCompression::Deflated,
            is_dir: false,
        }
    }

    /// Create a directory entry
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Vec::new(),
            compression: EntryCompression::Stored,
            is_dir: true,
        }
    }

    /// Set the compression method
    pub fn with_compression(mut self, compression: EntryCompression) -> Self {
        self.compression = compression;
        self
    }
}

/// The decoded DOCX archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
}

impl DocxPackage {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a package from entries, keeping their order
    pub fn from_entries(entries: Vec<PackageEntry>) -> Self {
        Self { entries }
    }

    /// Append an entry
    pub fn push(&mut self, entry: PackageEntry) {
        self.entries.push(entry);
    }

    /// All entries in archive order
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Names of all file entries in archive order
    pub fn file_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Check if a file entry exists
    pub fn contains(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    fn entry(&self, path: &str) -> Option<&PackageEntry> {
        self.entries.iter().find(|e| !e.is_dir && e.name == path)
    }

    /// Raw bytes of a part
    pub fn part_bytes(&self, path: &str) -> DocxResult<&[u8]> {
        self.entry(path)
            .map(|e| e.data.as_slice())
            .ok_or_else(|| DocxError::MissingPart(path.to_string()))
    }

    /// Text content of a part
    pub fn read_text(&self, path: &str) -> DocxResult<&str> {
        let bytes = self.part_bytes(path)?;
        std::str::from_utf8(bytes).map_err(|_| DocxError::NotText(path.to_string()))
    }

    /// Replace the content of an existing part.
    ///
    /// The entry keeps its position and compression method.
    pub fn replace_part(&mut self, path: &str, data: impl Into<Vec<u8>>) -> DocxResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| !e.is_dir && e.name == path)
            .ok_or_else(|| DocxError::MissingPart(path.to_string()))?;
        entry.data = data.into();
        Ok(())
    }

    /// Check if this looks like a word-processing package
    pub fn is_valid_docx(&self) -> bool {
        self.contains(CONTENT_TYPES_PART) && self.contains(MAIN_DOCUMENT_PART)
    }

    /// Header and footer parts belonging to the main document.
    ///
    /// Relationship targets of the main document are the primary source and
    /// decide the kind; entries named `word/header*.xml` / `word/footer*.xml`
    /// are added so that packages with missing or damaged relationships are
    /// still covered. Only parts present in the package are returned, sorted
    /// by path.
    pub fn header_footer_parts(&self) -> Vec<HeaderFooterPart> {
        let mut parts = BTreeMap::new();

        match self.read_text(DOCUMENT_RELS_PART).map(Relationships::parse) {
            Ok(Ok(rels)) => {
                for (rel_type, kind) in [
                    (relationship_types::HEADER, HeaderFooterKind::Header),
                    (relationship_types::FOOTER, HeaderFooterKind::Footer),
                ] {
                    for rel in rels.get_all_by_type(rel_type) {
                        if rel.target_mode == TargetMode::Internal {
                            parts.insert(resolve_target("word", &rel.target), kind);
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::debug!("Ignoring unreadable {}: {}", DOCUMENT_RELS_PART, e);
            }
            Err(e) => {
                tracing::debug!("No usable {}: {}", DOCUMENT_RELS_PART, e);
            }
        }

        for name in self.file_names() {
            if let Some(kind) = HeaderFooterKind::from_file_name(name) {
                parts.entry(name.to_string()).or_insert(kind);
            }
        }

        parts
            .into_iter()
            .filter(|(path, _)| self.contains(path))
            .map(|(path, kind)| HeaderFooterPart { path, kind })
            .collect()
    }
}
