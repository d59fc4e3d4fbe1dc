//! CSV input for batch generation
//!
//! Each row becomes one [`FormInput`]. The header row must name the three
//! fields; `rollNo`, `roll_no` and `roll no` are all accepted for the roll
//! number, and matching is case-insensitive.

use crate::error::{MailMergeError, Result};
use crate::form::FormInput;
use crate::placeholder::{FIELD_NAME, FIELD_ROLL_NO, FIELD_SECTION};
use std::io::Read;
use std::path::Path;

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn column_index(headers: &csv::StringRecord, field: &str) -> Result<usize> {
    let wanted = normalize_header(field);
    headers
        .iter()
        .position(|h| normalize_header(h) == wanted)
        .ok_or_else(|| MailMergeError::ColumnNotFound(field.to_string()))
}

/// Parse form rows from any CSV reader
pub fn load_batch_reader<R: Read>(reader: R) -> Result<Vec<FormInput>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let name_idx = column_index(&headers, FIELD_NAME)?;
    let roll_idx = column_index(&headers, FIELD_ROLL_NO)?;
    let section_idx = column_index(&headers, FIELD_SECTION)?;

    let mut forms = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        forms.push(FormInput::new(cell(name_idx), cell(roll_idx), cell(section_idx)));
    }

    tracing::debug!("Loaded {} batch records", forms.len());
    Ok(forms)
}

/// Parse form rows from a CSV string
pub fn load_batch_str(data: &str) -> Result<Vec<FormInput>> {
    load_batch_reader(data.as_bytes())
}

/// Parse form rows from a CSV file
pub fn load_batch_csv(path: impl AsRef<Path>) -> Result<Vec<FormInput>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MailMergeError::FileNotFound(path.display().to_string()));
    }
    let file = std::fs::File::open(path)?;
    load_batch_reader(file)
}
