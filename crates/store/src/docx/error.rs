//! Error types for DOCX package operations

use thiserror::Error;

/// Errors that can occur while reading, editing or writing a DOCX package
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (permission denied, short read, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// The bytes do not start with a ZIP signature
    #[error("Not a ZIP archive: {0}")]
    InvalidSignature(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Part exists but its content is not UTF-8 text
    #[error("Part is not valid UTF-8 text: {0}")]
    NotText(String),

    /// Template file could not be located
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocxError::XmlParse(format!("Attribute error: {}", err))
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
