//! Placeholder tokens and the map of values substituted for them

use crate::error::{MailMergeError, Result};
use crate::form::FormInput;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Key for the student's name
pub const FIELD_NAME: &str = "name";
/// Key for the roll number
pub const FIELD_ROLL_NO: &str = "rollNo";
/// Key for the section
pub const FIELD_SECTION: &str = "section";

/// Literal token form recognized in template text.
///
/// One syntax is chosen per configuration and applied to every part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSyntax {
    /// `{{key}}`
    #[default]
    DoubleBrace,
    /// `{key}`
    SingleBrace,
}

impl TokenSyntax {
    pub fn open(&self) -> &'static str {
        match self {
            Self::DoubleBrace => "{{",
            Self::SingleBrace => "{",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Self::DoubleBrace => "}}",
            Self::SingleBrace => "}",
        }
    }

    /// Render the token for a key
    pub fn token(&self, key: &str) -> String {
        format!("{}{}{}", self.open(), key, self.close())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoubleBrace => "double_brace",
            Self::SingleBrace => "single_brace",
        }
    }

    /// Find every well-formed token in a text and count its occurrences.
    ///
    /// A key is a run of ASCII letters, digits, `_`, `.` or `-` that does not
    /// start with a digit. Used to report what a template contains; the
    /// substitutor itself only looks for the keys it was given.
    pub fn scan(&self, text: &str) -> BTreeMap<String, usize> {
        let open = self.open();
        let close = self.close();
        let mut found = BTreeMap::new();
        let mut rest = text;

        while let Some(start) = rest.find(open) {
            let after_open = &rest[start + open.len()..];
            let key_len = after_open
                .char_indices()
                .find(|(_, c)| !is_key_char(*c))
                .map(|(i, _)| i)
                .unwrap_or(after_open.len());
            let key = &after_open[..key_len];

            if is_valid_key(key) && after_open[key_len..].starts_with(close) {
                *found.entry(key.to_string()).or_insert(0) += 1;
                rest = &after_open[key_len + close.len()..];
            } else {
                // Retry one byte further so `{{{name}}}` still yields `name`
                rest = &rest[start + 1..];
            }
        }

        found
    }
}

impl FromStr for TokenSyntax {
    type Err = MailMergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "double" | "double_brace" | "{{}}" => Ok(Self::DoubleBrace),
            "single" | "single_brace" | "{}" => Ok(Self::SingleBrace),
            other => Err(MailMergeError::UnknownSyntax(other.to_string())),
        }
    }
}

impl std::fmt::Display for TokenSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn is_valid_key(key: &str) -> bool {
    key.chars().next().is_some_and(|c| !c.is_ascii_digit())
}

/// Placeholder name to replacement value.
///
/// Built once per generation request and not modified afterwards; the
/// builder methods consume and return the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderMap {
    values: HashMap<String, String>,
}

impl PlaceholderMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key/value pair
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Map the three form fields to their keys
    pub fn from_form(form: &FormInput) -> Self {
        Self::new()
            .with(FIELD_NAME, form.name.as_str())
            .with(FIELD_ROLL_NO, form.roll_no.as_str())
            .with(FIELD_SECTION, form.section.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of the map with `<`, `>`, `&`, `'` and `"` in every value
    /// replaced by XML entities, ready to be placed in character data.
    pub fn escaped(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), quick_xml::escape::escape(v.as_str()).into_owned()))
            .collect();
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_forms() {
        assert_eq!(TokenSyntax::DoubleBrace.token("name"), "{{name}}");
        assert_eq!(TokenSyntax::SingleBrace.token("rollNo"), "{rollNo}");
        assert_eq!(TokenSyntax::default(), TokenSyntax::DoubleBrace);
    }

    #[test]
    fn test_syntax_from_str() {
        assert_eq!("double".parse::<TokenSyntax>().unwrap(), TokenSyntax::DoubleBrace);
        assert_eq!("{}".parse::<TokenSyntax>().unwrap(), TokenSyntax::SingleBrace);
        assert!(matches!("angle".parse::<TokenSyntax>(), Err(MailMergeError::UnknownSyntax(_))));
    }

    #[test]
    fn test_syntax_serialization() {
        assert_eq!(serde_json::to_string(&TokenSyntax::SingleBrace).unwrap(), "\"single_brace\"");
    }

    #[test]
    fn test_scan_double_brace() {
        let found = TokenSyntax::DoubleBrace.scan("{{name}} and {{name}}, {{rollNo}} {{ bad }} {{1x}}");
        assert_eq!(found.get("name"), Some(&2));
        assert_eq!(found.get("rollNo"), Some(&1));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_scan_nested_braces() {
        let found = TokenSyntax::DoubleBrace.scan("{{{section}}}");
        assert_eq!(found.get("section"), Some(&1));
    }

    #[test]
    fn test_scan_single_brace() {
        let found = TokenSyntax::SingleBrace.scan("<w:t>{name}</w:t><w:t>{section}</w:t>{}");
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["name", "section"]);
    }

    #[test]
    fn test_map_from_form() {
        let form = FormInput::new("Ann", "7", "B");
        let map = PlaceholderMap::from_form(&form);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(FIELD_ROLL_NO), Some("7"));
        assert_eq!(map.keys(), vec!["name", "rollNo", "section"]);
    }

    #[test]
    fn test_escaped_values() {
        let map = PlaceholderMap::new().with("name", "Tom & <Jerry>");
        assert_eq!(map.escaped().get("name"), Some("Tom &amp; &lt;Jerry&gt;"));
        // Original untouched
        assert_eq!(map.get("name"), Some("Tom & <Jerry>"));
    }
}
