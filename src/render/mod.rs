//! Rendering of outlines and reports.

mod json;

pub use json::{to_json, to_json_string, write_json, FailedDocument, JsonFormat};
