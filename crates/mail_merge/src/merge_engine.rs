//! Document Generation Engine
//!
//! Orchestrates one generation request: validate the form, decode the
//! template, substitute placeholders in the primary body part and then,
//! best-effort, in every header and footer part, re-encode the package and
//! name the output file.

use crate::error::MailMergeError;
use crate::filename::output_filename;
use crate::form::FormInput;
use crate::placeholder::{PlaceholderMap, TokenSyntax};
use crate::substitutor::Substitutor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use store::docx::{
    check_signature, visible_text, ArchiveCodec, DocxError, DocxPackage, HeaderFooterKind, HeaderFooterPart, ZipCodec,
};
use store::MAIN_DOCUMENT_PART;
use thiserror::Error;

/// What to do when a key has no token in the primary body part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPlaceholderPolicy {
    /// Record a diagnostic and still produce the document
    #[default]
    Warn,
    /// Abort the generation
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    pub token_syntax: TokenSyntax,
    pub missing_placeholder_policy: MissingPlaceholderPolicy,
    pub include_headers_footers: bool,
    /// XML-escape form values before they are substituted
    pub escape_values: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            token_syntax: TokenSyntax::DoubleBrace,
            missing_placeholder_policy: MissingPlaceholderPolicy::Warn,
            include_headers_footers: true,
            escape_values: true,
        }
    }
}

impl MergeOptions {
    pub fn strict() -> Self { Self { missing_placeholder_policy: MissingPlaceholderPolicy::Fail, ..Default::default() } }
    pub fn with_syntax(mut self, syntax: TokenSyntax) -> Self { self.token_syntax = syntax; self }
    pub fn with_policy(mut self, policy: MissingPlaceholderPolicy) -> Self { self.missing_placeholder_policy = policy; self }
    pub fn with_headers_footers(mut self, include: bool) -> Self { self.include_headers_footers = include; self }
    pub fn with_escape_values(mut self, escape: bool) -> Self { self.escape_values = escape; self }
}

/// Role of a part within the package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartRole { Body, Header, Footer }

impl From<HeaderFooterKind> for PartRole {
    fn from(kind: HeaderFooterKind) -> Self {
        match kind { HeaderFooterKind::Header => PartRole::Header, HeaderFooterKind::Footer => PartRole::Footer }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A key has no token in the primary body part
    PlaceholderNotFound,
    /// The token is present in the visible text but broken up by markup
    PlaceholderSplitAcrossRuns,
    /// A header or footer part could not be processed
    SecondaryPartFailure,
}

/// A non-fatal finding recorded during generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub part: String,
    pub key: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartReport {
    pub path: String,
    pub role: PartRole,
    pub replacements: BTreeMap<String, usize>,
    pub modified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub filename: String,
    pub size_bytes: usize,
    pub token_syntax: TokenSyntax,
    pub parts: Vec<PartReport>,
    pub diagnostics: Vec<Diagnostic>,
    pub generated_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn has_warnings(&self) -> bool { !self.diagnostics.is_empty() }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn summary(&self) -> String {
        let replaced: usize = self.parts.iter().flat_map(|p| p.replacements.values()).sum();
        format!("Generated {} ({} bytes): {} replacements in {} parts, {} warnings",
            self.filename, self.size_bytes, replaced,
            self.parts.iter().filter(|p| p.modified).count(), self.diagnostics.len())
    }
}

/// A finished document ready to be saved
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub report: GenerationReport,
}

/// Fatal error kinds, for callers that pick advice or exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind { InvalidInput, SourceUnavailable, MalformedArchive, MissingPrimaryPlaceholder, SerializationFailure }

impl ErrorKind {
    /// Guidance shown to the user next to the error message
    pub fn advice(&self) -> &'static str {
        match self {
            Self::InvalidInput => "Fill in every field (name, roll number and section) and try again.",
            Self::SourceUnavailable => "Check that the template file exists at the configured path and is readable.",
            Self::MalformedArchive => "The template must be a .docx file saved by a word processor; re-save it as Word Document (.docx).",
            Self::MissingPrimaryPlaceholder => "Add the missing placeholders to the template body, or allow missing placeholders.",
            Self::SerializationFailure => "The filled document could not be written; try again or check available memory.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::SourceUnavailable => "source_unavailable",
            Self::MalformedArchive => "malformed_archive",
            Self::MissingPrimaryPlaceholder => "missing_primary_placeholder",
            Self::SerializationFailure => "serialization_failure",
        }
    }
}

/// Errors that abort a generation request
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid form input: {0}")]
    InvalidInput(#[from] MailMergeError),

    #[error("Template unavailable at {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("Template is not a usable DOCX package: {0}")]
    MalformedArchive(String),

    #[error("Placeholders missing from the document body: {}", .keys.join(", "))]
    MissingPrimaryPlaceholder { keys: Vec<String> },

    #[error("Could not serialize the filled document: {0}")]
    SerializationFailure(String),
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Self::MalformedArchive(_) => ErrorKind::MalformedArchive,
            Self::MissingPrimaryPlaceholder { .. } => ErrorKind::MissingPrimaryPlaceholder,
            Self::SerializationFailure(_) => ErrorKind::SerializationFailure,
        }
    }
}

/// Tokens found in one part of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInspection {
    pub path: String,
    pub role: PartRole,
    pub tokens: BTreeMap<String, usize>,
    /// Tokens visible in the text but split by markup, so not replaceable
    pub split_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInspection {
    pub token_syntax: TokenSyntax,
    pub parts: Vec<PartInspection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub record_index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub documents: Vec<GeneratedDocument>,
    pub failures: Vec<BatchFailure>,
    pub summary: String,
}

impl BatchResult {
    pub fn is_success(&self) -> bool { self.failures.is_empty() }
}

pub struct MergeEngine<C: ArchiveCodec = ZipCodec> {
    codec: C,
    options: MergeOptions,
}

impl MergeEngine<ZipCodec> {
    pub fn new(options: MergeOptions) -> Self { Self { codec: ZipCodec::new(), options } }
}

impl<C: ArchiveCodec> MergeEngine<C> {
    pub fn with_codec(codec: C, options: MergeOptions) -> Self { Self { codec, options } }

    pub fn options(&self) -> &MergeOptions { &self.options }

    /// Read the template from disk and generate
    pub fn generate_from_path(&self, template: &Path, form: &FormInput) -> Result<GeneratedDocument, GenerateError> {
        let bytes = load_template(template)?;
        self.generate(&bytes, form)
    }

    /// Fill a template for one form submission
    pub fn generate(&self, template: &[u8], form: &FormInput) -> Result<GeneratedDocument, GenerateError> {
        let form = form.clone().validate()?;
        let mut package = self.decode(template)?;

        let map = PlaceholderMap::from_form(&form);
        let map = if self.options.escape_values { map.escaped() } else { map };
        let substitutor = Substitutor::new(self.options.token_syntax);

        let mut parts = Vec::new();
        let mut diagnostics = Vec::new();

        // Primary body: mandatory
        let body = package.read_text(MAIN_DOCUMENT_PART).map_err(|e| match e {
            DocxError::MissingPart(p) => GenerateError::MalformedArchive(format!("missing primary body part {}", p)),
            other => GenerateError::MalformedArchive(other.to_string()),
        })?;
        let result = substitutor.substitute(body, &map);

        let missing: Vec<String> = result.missing_keys().into_iter().map(String::from).collect();
        if !missing.is_empty() {
            if self.options.missing_placeholder_policy == MissingPlaceholderPolicy::Fail {
                return Err(GenerateError::MissingPrimaryPlaceholder { keys: missing });
            }
            diagnostics.extend(self.missing_diagnostics(body, &missing));
        }

        let modified = !result.is_unchanged();
        parts.push(PartReport {
            path: MAIN_DOCUMENT_PART.to_string(),
            role: PartRole::Body,
            replacements: result.occurrences,
            modified,
        });
        if modified {
            package.replace_part(MAIN_DOCUMENT_PART, result.text)
                .map_err(|e| GenerateError::MalformedArchive(e.to_string()))?;
        }

        // Headers and footers: best-effort, missing tokens expected
        if self.options.include_headers_footers {
            for part in package.header_footer_parts() {
                match self.substitute_secondary(&mut package, &substitutor, &part, &map) {
                    Ok(report) => parts.push(report),
                    Err(message) => {
                        tracing::warn!("Skipping {}: {}", part.path, message);
                        diagnostics.push(Diagnostic {
                            kind: DiagnosticKind::SecondaryPartFailure,
                            part: part.path,
                            key: None,
                            message,
                        });
                    }
                }
            }
        }

        let bytes = self.codec.encode(&package)
            .map_err(|e| GenerateError::SerializationFailure(e.to_string()))?;

        let filename = output_filename(&form.name, &form.roll_no);
        let report = GenerationReport {
            filename: filename.clone(),
            size_bytes: bytes.len(),
            token_syntax: self.options.token_syntax,
            parts,
            diagnostics,
            generated_at: Utc::now(),
        };
        tracing::info!("{}", report.summary());

        Ok(GeneratedDocument { filename, bytes, report })
    }

    /// Generate one document per form; failing records do not stop the rest
    pub fn generate_batch(&self, template: &[u8], forms: &[FormInput]) -> BatchResult {
        let mut documents: Vec<GeneratedDocument> = Vec::new();
        let mut failures = Vec::new();
        let mut used_names = HashSet::new();

        for (index, form) in forms.iter().enumerate() {
            match self.generate(template, form) {
                Ok(mut doc) => {
                    let unique = unique_filename(&doc.filename, &mut used_names);
                    if unique != doc.filename {
                        tracing::warn!("Record {} renamed to {} to avoid overwriting", index + 1, unique);
                        doc.report.filename = unique.clone();
                        doc.filename = unique;
                    }
                    documents.push(doc);
                }
                Err(err) => {
                    tracing::warn!("Record {} failed: {}", index + 1, err);
                    failures.push(BatchFailure { record_index: index, kind: err.kind(), message: err.to_string() });
                }
            }
        }

        let summary = format!("Generated {} of {} documents ({} failed)", documents.len(), forms.len(), failures.len());
        BatchResult { documents, failures, summary }
    }

    /// List the tokens each part of a template contains
    pub fn inspect(&self, template: &[u8]) -> Result<TemplateInspection, GenerateError> {
        let package = self.decode(template)?;
        let syntax = self.options.token_syntax;

        let mut targets = vec![(MAIN_DOCUMENT_PART.to_string(), PartRole::Body)];
        targets.extend(package.header_footer_parts().into_iter().map(|p| (p.path, PartRole::from(p.kind))));

        let mut parts = Vec::new();
        for (path, role) in targets {
            let text = match package.read_text(&path) {
                Ok(text) => text,
                Err(DocxError::MissingPart(p)) if p == MAIN_DOCUMENT_PART => {
                    return Err(GenerateError::MalformedArchive(format!("missing primary body part {}", p)));
                }
                Err(e) => {
                    tracing::warn!("Cannot inspect {}: {}", path, e);
                    continue;
                }
            };
            let tokens = syntax.scan(text);
            let split_tokens = match visible_text(text) {
                Ok(visible) => syntax.scan(&visible).into_keys().filter(|k| !tokens.contains_key(k)).collect(),
                Err(e) => {
                    tracing::debug!("No visible text for {}: {}", path, e);
                    Vec::new()
                }
            };
            parts.push(PartInspection { path, role, tokens, split_tokens });
        }

        Ok(TemplateInspection { token_syntax: syntax, parts })
    }

    fn decode(&self, template: &[u8]) -> Result<DocxPackage, GenerateError> {
        check_signature(template).map_err(|e| GenerateError::MalformedArchive(e.to_string()))?;
        self.codec.decode(template).map_err(|e| GenerateError::MalformedArchive(e.to_string()))
    }

    fn missing_diagnostics(&self, body: &str, missing: &[String]) -> Vec<Diagnostic> {
        let visible = match visible_text(body) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("Could not extract body text: {}", e);
                None
            }
        };

        missing.iter().map(|key| {
            let token = self.options.token_syntax.token(key);
            let split = visible.as_deref().is_some_and(|text| text.contains(&token));
            let (kind, message) = if split {
                (DiagnosticKind::PlaceholderSplitAcrossRuns,
                 format!("Placeholder {} is split by formatting in the template; retype it in one go", token))
            } else {
                (DiagnosticKind::PlaceholderNotFound, format!("Placeholder {} not found in the document body", token))
            };
            tracing::warn!("{}", message);
            Diagnostic { kind, part: MAIN_DOCUMENT_PART.to_string(), key: Some(key.clone()), message }
        }).collect()
    }

    fn substitute_secondary(
        &self,
        package: &mut DocxPackage,
        substitutor: &Substitutor,
        part: &HeaderFooterPart,
        map: &PlaceholderMap,
    ) -> Result<PartReport, String> {
        let path = part.path.as_str();
        let bytes = package.part_bytes(path).map_err(|e| e.to_string())?;
        let result = substitutor.substitute_bytes(path, bytes, map).map_err(|e| e.to_string())?;

        let modified = !result.is_unchanged();
        if modified {
            package.replace_part(path, result.text).map_err(|e| e.to_string())?;
        }
        Ok(PartReport { path: path.to_string(), role: part.kind.into(), replacements: result.occurrences, modified })
    }
}

/// Read template bytes, mapping every failure to `SourceUnavailable`
pub fn load_template(path: &Path) -> Result<Vec<u8>, GenerateError> {
    store::read_template(path).map_err(|e| GenerateError::SourceUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn unique_filename(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
    let mut n = 2;
    loop {
        let candidate = if ext.is_empty() { format!("{}_{}", stem, n) } else { format!("{}_{}.{}", stem, n, ext) };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
