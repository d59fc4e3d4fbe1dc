//! XML reading utilities for DOCX parts

use crate::docx::error::{DocxError, DocxResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// XML reader utilities for parsing DOCX XML content
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader from a string
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Get an attribute value from an event
    pub fn get_attribute(event: &quick_xml::events::BytesStart, name: &[u8]) -> Option<String> {
        event.attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected || name_str.ends_with(&format!(":{}", expected))
    }
}

/// Collect the content of the `w:t` elements of a part, in document order.
///
/// Markup, indentation between elements, field instructions and deleted
/// text are dropped and entities are unescaped, so a token that Word split
/// across several runs shows up here as one contiguous string.
pub fn visible_text(xml: &str) -> DocxResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if XmlParser::matches_element(e.name().as_ref(), "t") => {
                in_text = true;
            }
            Ok(Event::End(ref e)) if XmlParser::matches_element(e.name().as_ref(), "t") => {
                in_text = false;
            }
            Ok(Event::Text(ref e)) if in_text => text.push_str(&e.unescape()?),
            Ok(Event::CData(ref e)) if in_text => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocxError::from(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}
