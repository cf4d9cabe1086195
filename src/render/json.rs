//! JSON rendering.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Document, OutlineNode};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Output written in place of a document that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedDocument {
    pub title: String,
    pub outline: Vec<OutlineNode>,
    pub error: String,
}

impl FailedDocument {
    pub fn new(error: impl ToString) -> Self {
        Self {
            title: String::new(),
            outline: Vec::new(),
            error: error.to_string(),
        }
    }
}

/// Serialize any value in the given format.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    to_json_string(doc, format)
}

/// Serialize a value and write it to `path`.
pub fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
    format: JsonFormat,
) -> Result<()> {
    let json = to_json_string(value, format)?;
    fs::write(path, json)?;
    Ok(())
}
