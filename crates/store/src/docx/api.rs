//! Public API for loading and saving DOCX packages
//!
//! This module provides the file-level entry points used by the generator.

use crate::docx::codec::{ArchiveCodec, ZipCodec};
use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::DocxPackage;
use std::path::Path;

/// Read the raw bytes of a template file
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The template bytes
/// * `Err(DocxError::TemplateNotFound)` - If the file does not exist
/// * `Err(DocxError::Io)` - For any other read failure
pub fn read_template(path: &Path) -> DocxResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocxError::TemplateNotFound(path.display().to_string())
        } else {
            DocxError::Io(e)
        }
    })
}

/// Open a DOCX file from disk with the default codec
///
/// # Example
///
/// ```ignore
/// use store::docx::open_package;
/// use std::path::Path;
///
/// let package = open_package(Path::new("template.docx"))?;
/// ```
pub fn open_package(path: &Path) -> DocxResult<DocxPackage> {
    let bytes = read_template(path)?;
    ZipCodec::new().decode(&bytes)
}

/// Write package bytes to disk, creating parent directories as needed
pub fn write_package_bytes(bytes: &[u8], path: &Path) -> DocxResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::package::PackageEntry;
    use crate::docx::{CONTENT_TYPES_PART, MAIN_DOCUMENT_PART};
    use tempfile::TempDir;

    #[test]
    fn test_read_nonexistent_template() {
        let result = read_template(Path::new("/nonexistent/path/template.docx"));
        assert!(matches!(result, Err(DocxError::TemplateNotFound(_))));
    }

    #[test]
    fn test_write_then_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/nested/doc.docx");

        let package = DocxPackage::from_entries(vec![
            PackageEntry::file(CONTENT_TYPES_PART, "<Types/>"),
            PackageEntry::file(MAIN_DOCUMENT_PART, "<w:document/>"),
        ]);
        let bytes = ZipCodec::new().encode(&package).unwrap();
        write_package_bytes(&bytes, &path).unwrap();

        let reopened = open_package(&path).unwrap();
        assert!(reopened.is_valid_docx());
        assert_eq!(reopened.read_text(MAIN_DOCUMENT_PART).unwrap(), "<w:document/>");
    }
}
