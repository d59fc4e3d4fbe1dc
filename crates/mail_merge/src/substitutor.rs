//! Placeholder substitution over document part text
//!
//! Substitution is a single left-to-right pass. At every opening delimiter
//! the known tokens are tried (longest first); a match is replaced by its
//! value, anything else is copied through unchanged. Inserted values are
//! never scanned again, so a value that itself looks like a token stays
//! literal and the order of keys in the map has no effect on the result.
//!
//! Values are inserted verbatim. Callers placing values in XML character
//! data must escape `<`, `>` and `&` beforehand (see
//! [`PlaceholderMap::escaped`]).

use crate::placeholder::{PlaceholderMap, TokenSyntax};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from the untyped substitution entry point
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubstituteError {
    /// Content is not UTF-8 text
    #[error("Part {path} is not UTF-8 text")]
    NotText { path: String },
}

/// A named XML text part taken from the package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPart {
    pub path: String,
    pub content: String,
}

impl DocumentPart {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Build a part from raw bytes, rejecting anything that is not UTF-8
    pub fn from_bytes(path: impl Into<String>, bytes: &[u8]) -> Result<Self, SubstituteError> {
        let path = path.into();
        match std::str::from_utf8(bytes) {
            Ok(content) => Ok(Self::new(path, content)),
            Err(_) => Err(SubstituteError::NotText { path }),
        }
    }
}

/// Outcome of substituting one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// The rewritten text
    pub text: String,
    /// Replacements made per key (every key of the map is present)
    pub occurrences: BTreeMap<String, usize>,
}

impl Substitution {
    /// Keys with no occurrence in the input, sorted
    pub fn missing_keys(&self) -> Vec<&str> {
        self.occurrences
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Keys that were replaced at least once, sorted
    pub fn found_keys(&self) -> Vec<&str> {
        self.occurrences
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn total_replacements(&self) -> usize {
        self.occurrences.values().sum()
    }

    /// True when nothing was replaced and the text equals the input
    pub fn is_unchanged(&self) -> bool {
        self.total_replacements() == 0
    }
}

/// Stateless substitutor for one token syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Substitutor {
    syntax: TokenSyntax,
}

impl Substitutor {
    pub fn new(syntax: TokenSyntax) -> Self {
        Self { syntax }
    }

    pub fn syntax(&self) -> TokenSyntax {
        self.syntax
    }

    /// Replace every token of every key in `text`
    pub fn substitute(&self, text: &str, map: &PlaceholderMap) -> Substitution {
        let mut tokens: Vec<(String, &str, &str)> = map
            .iter()
            .map(|(key, value)| (self.syntax.token(key), key, value))
            .collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.1.cmp(b.1)));

        let mut occurrences: BTreeMap<String, usize> =
            map.keys().into_iter().map(|k| (k.to_string(), 0)).collect();

        let open = self.syntax.open();
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find(open) {
            let (before, candidate) = rest.split_at(pos);
            out.push_str(before);

            match tokens.iter().find(|(token, _, _)| candidate.starts_with(token.as_str())) {
                Some((token, key, value)) => {
                    out.push_str(value);
                    if let Some(count) = occurrences.get_mut(*key) {
                        *count += 1;
                    }
                    rest = &candidate[token.len()..];
                }
                None => {
                    // Delimiters are ASCII, so one byte is one char here
                    out.push_str(&candidate[..1]);
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);

        Substitution { text: out, occurrences }
    }

    /// Substitute within a document part
    pub fn substitute_part(&self, part: &DocumentPart, map: &PlaceholderMap) -> Substitution {
        let result = self.substitute(&part.content, map);
        tracing::debug!(
            part = %part.path,
            replaced = result.total_replacements(),
            "Substituted placeholders"
        );
        result
    }

    /// Substitute within raw part bytes
    pub fn substitute_bytes(
        &self,
        path: &str,
        bytes: &[u8],
        map: &PlaceholderMap,
    ) -> Result<Substitution, SubstituteError> {
        let part = DocumentPart::from_bytes(path, bytes)?;
        Ok(self.substitute_part(&part, map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_map() -> PlaceholderMap {
        PlaceholderMap::new()
            .with("name", "Ann")
            .with("rollNo", "7")
            .with("section", "B")
    }

    #[test]
    fn test_end_to_end_sentence() {
        let s = Substitutor::new(TokenSyntax::DoubleBrace);
        let result = s.substitute("Hello {{name}}, roll {{rollNo}}, sec {{section}}.", &sample_map());
        assert_eq!(result.text, "Hello Ann, roll 7, sec B.");
        assert!(result.missing_keys().is_empty());
        assert_eq!(result.total_replacements(), 3);
    }

    #[test]
    fn test_missing_key_reported() {
        let s = Substitutor::default();
        let result = s.substitute("Hello {{name}}, roll {{rollNo}}.", &sample_map());
        assert_eq!(result.text, "Hello Ann, roll 7.");
        assert_eq!(result.missing_keys(), vec!["section"]);
        assert_eq!(result.found_keys(), vec!["name", "rollNo"]);
    }

    #[test]
    fn test_single_brace_syntax() {
        let s = Substitutor::new(TokenSyntax::SingleBrace);
        let result = s.substitute("<w:t>{name}</w:t><w:t>{{name}}</w:t>", &sample_map());
        // `{{name}}` contains `{name}` one byte in
        assert_eq!(result.text, "<w:t>Ann</w:t><w:t>{Ann}</w:t>");
        assert_eq!(result.occurrences["name"], 2);
    }

    #[test]
    fn test_double_brace_ignores_single() {
        let s = Substitutor::new(TokenSyntax::DoubleBrace);
        let result = s.substitute("{name} {{name}}", &sample_map());
        assert_eq!(result.text, "{name} Ann");
    }

    #[test]
    fn test_whitespace_inside_token_is_not_a_match() {
        let s = Substitutor::default();
        let result = s.substitute("{{ name }}", &sample_map());
        assert!(result.is_unchanged());
        assert_eq!(result.text, "{{ name }}");
    }

    #[test]
    fn test_value_containing_token_is_literal() {
        let map = PlaceholderMap::new().with("name", "{{rollNo}}").with("rollNo", "7");
        let result = Substitutor::default().substitute("{{name}}/{{rollNo}}", &map);
        assert_eq!(result.text, "{{rollNo}}/7");
        assert_eq!(result.occurrences["rollNo"], 1);
    }

    #[test]
    fn test_values_are_not_escaped() {
        let map = PlaceholderMap::new().with("name", "A & B");
        let result = Substitutor::default().substitute("<w:t>{{name}}</w:t>", &map);
        assert_eq!(result.text, "<w:t>A & B</w:t>");
    }

    #[test]
    fn test_multibyte_text_preserved() {
        let result = Substitutor::default().substitute("Grüße {{name}} … ✓ {", &sample_map());
        assert_eq!(result.text, "Grüße Ann … ✓ {");
    }

    #[test]
    fn test_empty_map() {
        let result = Substitutor::default().substitute("{{name}}", &PlaceholderMap::new());
        assert_eq!(result.text, "{{name}}");
        assert!(result.occurrences.is_empty());
    }

    #[test]
    fn test_non_text_bytes() {
        let s = Substitutor::default();
        let err = s.substitute_bytes("word/document.xml", &[0xff, 0xfe, 0x00], &sample_map()).unwrap_err();
        assert_eq!(err, SubstituteError::NotText { path: "word/document.xml".into() });
    }

    #[test]
    fn test_substitute_part() {
        let part = DocumentPart::new("word/header1.xml", "<w:hdr>{{section}}</w:hdr>");
        let result = Substitutor::default().substitute_part(&part, &sample_map());
        assert_eq!(result.text, "<w:hdr>B</w:hdr>");
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9]{0,8}"
    }

    // Filler text never contains a brace, so the only tokens are the ones we place
    fn filler_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 <>/=\"\n\t.,:;-]{0,40}"
    }

    proptest! {
        #[test]
        fn prop_no_tokens_is_noop(
            text in filler_strategy(),
            key in key_strategy(),
            value in "[a-zA-Z0-9 ]{0,12}",
        ) {
            let map = PlaceholderMap::new().with(key, value);
            for syntax in [TokenSyntax::DoubleBrace, TokenSyntax::SingleBrace] {
                let result = Substitutor::new(syntax).substitute(&text, &map);
                prop_assert_eq!(&result.text, &text);
                prop_assert!(result.is_unchanged());
            }
        }

        #[test]
        fn prop_replaces_exactly_n_occurrences(
            pieces in prop::collection::vec(filler_strategy(), 1..6),
            key in key_strategy(),
            value in "[a-zA-Z0-9 ]{0,12}",
        ) {
            let syntax = TokenSyntax::DoubleBrace;
            let token = syntax.token(&key);
            let text = pieces.join(&token);
            let expected = pieces.join(&value);
            let n = pieces.len() - 1;

            let result = Substitutor::new(syntax).substitute(&text, &PlaceholderMap::new().with(key.clone(), value.clone()));

            prop_assert_eq!(result.occurrences[&key], n);
            prop_assert_eq!(&result.text, &expected);
            let delta = result.text.len() as isize - text.len() as isize;
            prop_assert_eq!(delta, n as isize * (value.len() as isize - token.len() as isize));
        }

        #[test]
        fn prop_disjoint_key_sets_commute(
            pieces in prop::collection::vec(filler_strategy(), 4),
            a_key in "a[a-z]{0,5}",
            b_key in "b[a-z]{0,5}",
            a_value in "[a-zA-Z0-9 ]{0,8}",
            b_value in "[a-zA-Z0-9 ]{0,8}",
        ) {
            let syntax = TokenSyntax::DoubleBrace;
            let text = format!(
                "{}{}{}{}{}{}{}",
                pieces[0], syntax.token(&a_key), pieces[1], syntax.token(&b_key),
                pieces[2], syntax.token(&a_key), pieces[3]
            );
            let a = PlaceholderMap::new().with(a_key, a_value);
            let b = PlaceholderMap::new().with(b_key, b_value);
            let s = Substitutor::new(syntax);

            let ab = s.substitute(&s.substitute(&text, &a).text, &b).text;
            let ba = s.substitute(&s.substitute(&text, &b).text, &a).text;
            prop_assert_eq!(ab, ba);
        }
    }
}
