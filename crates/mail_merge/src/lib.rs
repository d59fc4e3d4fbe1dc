//! Mail Merge for DOCX templates
//!
//! This crate fills placeholder tokens in a DOCX template with the values of
//! a submitted form and produces a downloadable document.
//!
//! # Features
//!
//! - Literal placeholder substitution with a configurable token syntax
//!   (`{{key}}` or `{key}`)
//! - Primary body part required, headers and footers processed best-effort
//! - Structured diagnostics for missing or split placeholders
//! - Explicit error kinds for every fatal failure
//! - Batch generation from CSV rows
//!
//! # Example
//!
//! ```rust
//! use mail_merge::{PlaceholderMap, Substitutor, TokenSyntax};
//!
//! let map = PlaceholderMap::new()
//!     .with("name", "Ann")
//!     .with("rollNo", "7")
//!     .with("section", "B");
//!
//! let result = Substitutor::new(TokenSyntax::DoubleBrace)
//!     .substitute("Hello {{name}}, roll {{rollNo}}, sec {{section}}.", &map);
//!
//! assert_eq!(result.text, "Hello Ann, roll 7, sec B.");
//! assert!(result.missing_keys().is_empty());
//! ```

mod batch;
mod error;
mod filename;
mod form;
pub mod merge_engine;
pub mod placeholder;
pub mod substitutor;

// Re-export main types
pub use batch::{load_batch_csv, load_batch_reader, load_batch_str};
pub use error::{MailMergeError, Result};
pub use filename::{output_filename, sanitize_component, OUTPUT_EXTENSION};
pub use form::FormInput;
pub use merge_engine::{
    load_template, BatchFailure, BatchResult, Diagnostic, DiagnosticKind, ErrorKind,
    GenerateError, GeneratedDocument, GenerationReport, MergeEngine, MergeOptions,
    MissingPlaceholderPolicy, PartInspection, PartReport, PartRole, TemplateInspection,
};
pub use placeholder::{PlaceholderMap, TokenSyntax, FIELD_NAME, FIELD_ROLL_NO, FIELD_SECTION};
pub use substitutor::{DocumentPart, SubstituteError, Substitution, Substitutor};
