//! Error types for pdfoutline library.

use std::io;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building an outline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Learned classifier failure.
    #[error("Classifier error: {0}")]
    Model(#[from] ModelError),

    /// Embedding provider failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Malformed prediction or gold file during evaluation.
    #[error("Evaluation error: {0}")]
    Eval(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

/// Failures of the learned classifier artifact.
///
/// Kept apart from [`Error`] so the classifier can tell "the artifact is
/// unusable" from "one prediction went wrong" without string matching.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The artifact file does not exist.
    #[error("classifier artifact not found: {0}")]
    NotFound(String),

    /// The artifact could not be read or decoded.
    #[error("cannot decode classifier artifact: {0}")]
    Decode(String),

    /// The artifact decoded but is structurally invalid.
    #[error("invalid classifier artifact: {0}")]
    Invalid(String),

    /// A prediction produced no usable probabilities.
    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// Reasons the document language could not be identified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageError {
    /// No non-empty line to sample.
    #[error("no text to sample")]
    EmptySample,

    /// Too few letters to decide.
    #[error("sample too short ({0} letters)")]
    TooShort(usize),

    /// No single script dominates the sample.
    #[error("no dominant script")]
    Ambiguous,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_model_error_conversion() {
        let err: Error = ModelError::Invalid("no classes".into()).into();
        assert_eq!(
            err.to_string(),
            "Classifier error: invalid classifier artifact: no classes"
        );
    }
}
