//! Store - DOCX package access
//!
//! This crate handles reading template files, decoding DOCX archives into
//! editable packages, locating header and footer parts, and encoding the
//! package back to bytes.

pub mod docx;

// Re-export DOCX functionality
pub use docx::{
    check_signature, open_package, read_template, visible_text, write_package_bytes,
    ArchiveCodec, DocxError, DocxPackage, DocxResult, EntryCompression, HeaderFooterKind,
    HeaderFooterPart, PackageEntry, ZipCodec,
    CONTENT_TYPES_PART, DOCUMENT_RELS_PART, MAIN_DOCUMENT_PART,
};
