//! Relationships (.rels) file parsing
//!
//! DOCX uses relationships to connect parts of the document together. The
//! main document's relationships name the header and footer parts that
//! belong to it.

use crate::docx::error::{DocxError, DocxResult};
use crate::docx::reader::XmlParser;
use quick_xml::events::Event;
use std::collections::BTreeMap;

/// A single relationship in a .rels file
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Collection of relationships from a .rels file
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    relationships: BTreeMap<String, Relationship>,
}

impl Relationships {
    /// Parse a .rels file from its XML content
    pub fn parse(content: &str) -> DocxResult<Self> {
        let mut result = Self::default();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Relationship") {
                        let id = XmlParser::get_attribute(e, b"Id")
                            .ok_or_else(|| DocxError::XmlParse("Relationship missing Id".into()))?;
                        let rel_type = XmlParser::get_attribute(e, b"Type")
                            .ok_or_else(|| DocxError::XmlParse("Relationship missing Type".into()))?;
                        let target = XmlParser::get_attribute(e, b"Target")
                            .ok_or_else(|| DocxError::XmlParse("Relationship missing Target".into()))?;
                        let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                            .map(|m| if m == "External" { TargetMode::External } else { TargetMode::Internal })
                            .unwrap_or(TargetMode::Internal);

                        result.relationships.insert(id.clone(), Relationship {
                            id,
                            rel_type,
                            target,
                            target_mode,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(DocxError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Get all relationships of a given type, ordered by ID
    pub fn get_all_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.relationships.values()
            .filter(|r| r.rel_type == rel_type)
            .collect()
    }
}

/// Resolve an internal relationship target to a package path.
///
/// Targets are relative to the directory of the source part (`word/` for
/// `word/document.xml`) unless they start with `/`, which anchors them at the
/// package root. `..` segments are folded.
pub fn resolve_target(source_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if source_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", source_dir.trim_end_matches('/'), target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::relationship_types;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="/word/footer1.xml"/>
    <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_relationships_parsing() {
        let rels = Relationships::parse(DOCUMENT_RELS).unwrap();

        let headers = rels.get_all_by_type(relationship_types::HEADER);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].id, "rId2");
        assert_eq!(headers[0].target, "header1.xml");
        assert_eq!(headers[0].target_mode, TargetMode::Internal);

        let footers = rels.get_all_by_type(relationship_types::FOOTER);
        assert_eq!(footers[0].target, "/word/footer1.xml");
    }

    #[test]
    fn test_external_target_mode() {
        let rels = Relationships::parse(DOCUMENT_RELS).unwrap();
        let links = rels.get_all_by_type("http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target_mode, TargetMode::External);
    }

    #[test]
    fn test_relationship_missing_target() {
        let xml = r#"<Relationships><Relationship Id="rId1" Type="x"/></Relationships>"#;
        assert!(matches!(Relationships::parse(xml), Err(DocxError::XmlParse(_))));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word", "header1.xml"), "word/header1.xml");
        assert_eq!(resolve_target("word", "/word/footer2.xml"), "word/footer2.xml");
        assert_eq!(resolve_target("word", "../customXml/item1.xml"), "customXml/item1.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }
}
