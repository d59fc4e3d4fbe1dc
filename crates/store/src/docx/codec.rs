//! Archive codec
//!
//! Maps a ZIP byte sequence to a [`DocxPackage`] and back. The codec is a
//! trait so that the substitution logic does not depend on which archive
//! library backs it.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::package::{DocxPackage, EntryCompression, PackageEntry};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Local file header signature
const ZIP_LOCAL_HEADER: [u8; 4] = [b'P', b'K', 0x03, 0x04];
/// End of central directory signature (an archive with no entries)
const ZIP_EMPTY_ARCHIVE: [u8; 4] = [b'P', b'K', 0x05, 0x06];

/// Decode/encode capability for a package archive
pub trait ArchiveCodec {
    /// Turn archive bytes into a package
    fn decode(&self, bytes: &[u8]) -> DocxResult<DocxPackage>;

    /// Serialize a package back to archive bytes
    fn encode(&self, package: &DocxPackage) -> DocxResult<Vec<u8>>;
}

/// Check that the bytes start with a ZIP signature
pub fn check_signature(bytes: &[u8]) -> DocxResult<()> {
    if bytes.len() < 4 {
        return Err(DocxError::InvalidSignature(format!(
            "input is only {} bytes long",
            bytes.len()
        )));
    }
    let head = &bytes[..4];
    if head == ZIP_LOCAL_HEADER || head == ZIP_EMPTY_ARCHIVE {
        Ok(())
    } else {
        Err(DocxError::InvalidSignature(format!(
            "unexpected leading bytes {:02x?}",
            head
        )))
    }
}

/// [`ArchiveCodec`] backed by the `zip` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ZipCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveCodec for ZipCodec {
    fn decode(&self, bytes: &[u8]) -> DocxResult<DocxPackage> {
        check_signature(bytes)?;
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut package = DocxPackage::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if file.is_dir() {
                package.push(PackageEntry::directory(name));
                continue;
            }

            let compression = match file.compression() {
                CompressionMethod::Stored => EntryCompression::Stored,
                _ => EntryCompression::Deflated,
            };

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            package.push(PackageEntry::file(name, data).with_compression(compression));
        }

        tracing::debug!("Decoded package with {} entries", package.entries().len());
        Ok(package)
    }

    fn encode(&self, package: &DocxPackage) -> DocxResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in package.entries() {
            let method = match entry.compression {
                EntryCompression::Stored => CompressionMethod::Stored,
                EntryCompression::Deflated => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::{CONTENT_TYPES_PART, MAIN_DOCUMENT_PART};

    fn sample_package() -> DocxPackage {
        DocxPackage::from_entries(vec![
            PackageEntry::file(CONTENT_TYPES_PART, "<Types/>"),
            PackageEntry::directory("word/"),
            PackageEntry::file(MAIN_DOCUMENT_PART, "<w:document> {{name}} </w:document>"),
            PackageEntry::file("word/media/image1.png", vec![0u8, 1, 2, 3, 255])
                .with_compression(EntryCompression::Stored),
        ])
    }

    #[test]
    fn test_signature_accepts_zip() {
        assert!(check_signature(b"PK\x03\x04rest").is_ok());
        assert!(check_signature(b"PK\x05\x06rest").is_ok());
    }

    #[test]
    fn test_signature_rejects_other_bytes() {
        assert!(matches!(check_signature(b"<?xml"), Err(DocxError::InvalidSignature(_))));
        assert!(matches!(check_signature(b"PK"), Err(DocxError::InvalidSignature(_))));
        assert!(matches!(check_signature(b""), Err(DocxError::InvalidSignature(_))));
    }

    #[test]
    fn test_encode_then_decode_preserves_entries() {
        let codec = ZipCodec::new();
        let original = sample_package();
        let bytes = codec.encode(&original).unwrap();
        let decoded = codec.decode(&bytes).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_truncated_archive() {
        let codec = ZipCodec::new();
        let bytes = codec.encode(&sample_package()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(matches!(codec.decode(truncated), Err(DocxError::Zip(_))));
    }

    proptest::proptest! {
        #[test]
        fn prop_replacing_body_leaves_other_parts_untouched(
            body in ".{0,200}",
            blob in proptest::collection::vec(proptest::num::u8::ANY, 0..256),
        ) {
            let codec = ZipCodec::new();
            let mut package = sample_package();
            package.push(PackageEntry::file("word/embeddings/blob.bin", blob.clone()));

            package.replace_part(MAIN_DOCUMENT_PART, body.clone()).unwrap();
            let decoded = codec.decode(&codec.encode(&package).unwrap()).unwrap();

            proptest::prop_assert_eq!(decoded.read_text(MAIN_DOCUMENT_PART).unwrap(), body.as_str());
            proptest::prop_assert_eq!(decoded.part_bytes("word/embeddings/blob.bin").unwrap(), blob.as_slice());
            proptest::prop_assert_eq!(
                decoded.part_bytes("word/media/image1.png").unwrap(),
                &[0u8, 1, 2, 3, 255][..]
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_zip() {
        let codec = ZipCodec::new();
        assert!(matches!(
            codec.decode(b"this is plain text"),
            Err(DocxError::InvalidSignature(_))
        ));
    }
}
