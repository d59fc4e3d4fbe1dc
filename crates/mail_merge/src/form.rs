//! Form input: the three fields a generation request is made from

use crate::error::{MailMergeError, Result};
use crate::placeholder::{FIELD_NAME, FIELD_ROLL_NO, FIELD_SECTION};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The submitted form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    pub roll_no: String,
    pub section: String,
}

impl FormInput {
    pub fn new(name: impl Into<String>, roll_no: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roll_no: roll_no.into(),
            section: section.into(),
        }
    }

    /// Trim every field and require all of them to be non-empty
    pub fn validate(self) -> Result<Self> {
        let form = Self {
            name: self.name.trim().to_string(),
            roll_no: self.roll_no.trim().to_string(),
            section: self.section.trim().to_string(),
        };

        for (field, value) in [
            (FIELD_NAME, &form.name),
            (FIELD_ROLL_NO, &form.roll_no),
            (FIELD_SECTION, &form.section),
        ] {
            if value.is_empty() {
                return Err(MailMergeError::FieldRequired(field.to_string()));
            }
        }

        Ok(form)
    }

    /// Load form fields from a JSON object such as
    /// `{"name": "Ann", "rollNo": "7", "section": "B"}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load form fields from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MailMergeError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
