//! DOCX Package Module
//!
//! This module provides access to the parts of a Microsoft Word DOCX file.
//! DOCX is based on the Office Open XML (OOXML) format defined in ECMA-376.
//!
//! ## Structure
//!
//! A DOCX file is a ZIP archive containing XML files:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Document relationships
//! - `word/header*.xml`, `word/footer*.xml` - Headers and footers
//! - `word/media/` - Embedded images and media
//!
//! Parts are kept as raw bytes. Nothing here interprets WordprocessingML
//! beyond the relationships needed to locate headers and footers.

mod api;
mod codec;
mod error;
mod package;
mod reader;
mod relationships;

pub use api::{open_package, read_template, write_package_bytes};
pub use codec::{check_signature, ArchiveCodec, ZipCodec};
pub use error::{DocxError, DocxResult};
pub use package::{DocxPackage, EntryCompression, HeaderFooterKind, HeaderFooterPart, PackageEntry};
pub use reader::{visible_text, XmlParser};
pub use relationships::{resolve_target, Relationship, Relationships, TargetMode};

/// Path of the primary body part
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";
/// Path of the content types part
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Path of the main document's relationships
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
}
