//! # pdfoutline
//!
//! Title and heading outline extraction from the text layer of PDF files.
//!
//! Lines are read from the PDF text layer together with their font size,
//! weight and position. Heuristics (font ranking, numbering patterns,
//! language-aware word counts, semantic redundancy) and an optional learned
//! classifier decide which lines are headings and at which level. The
//! headings are then nested into a tree and written as JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{outline_file, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let doc = outline_file("report.pdf")?;
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Heading levels**: H1-H4 from numbering patterns and font ranking
//! - **Nested output**: H2 under H1, H3 under H2 or H1
//! - **Multilingual**: wider word-count window for caseless scripts (CJK, Arabic, ...)
//! - **Learned overlay**: optional tree-ensemble classifier artifact
//! - **Batch mode**: one JSON per PDF, with per-document failure isolation
//! - **Evaluation**: per-level precision/recall/F1 against gold outlines

pub mod analysis;
pub mod batch;
pub mod detect;
pub mod error;
pub mod eval;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use analysis::{
    ClassifierArtifact, ClassifierHandle, DedupPolicy, EmbeddingProvider, HashingEmbedder,
    Language, LevelStrategy,
};
pub use batch::{run_batch, run_batch_with_progress, BatchOptions, BatchSummary, DocumentReport};
pub use detect::{check_pdf_file, list_pdfs, pdf_version};
pub use error::{Error, LanguageError, ModelError, Result};
pub use eval::{evaluate, evaluate_files, EvaluationReport, LevelMetrics};
pub use model::{Document, HeadingCandidate, HeadingLevel, OutlineNode, PageWords, TextLine, Word};
pub use parser::{ErrorMode, ExtractOptions, LopdfTextLayer, TextLayer};
pub use pipeline::{OutlineOptions, Outliner};
pub use render::JsonFormat;

use std::path::Path;

/// Build the outline of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::outline_file;
///
/// let doc = outline_file("report.pdf").unwrap();
/// println!("{} ({} headings)", doc.title, doc.total_nodes());
/// ```
pub fn outline_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    Outliner::default().outline_file(path)
}

/// Build the outline of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{outline_file_with_options, DedupPolicy, OutlineOptions};
///
/// let options = OutlineOptions::new()
///     .with_dedup(DedupPolicy::Page)
///     .lenient_pages();
/// let doc = outline_file_with_options("report.pdf", options).unwrap();
/// ```
pub fn outline_file_with_options<P: AsRef<Path>>(
    path: P,
    options: OutlineOptions,
) -> Result<Document> {
    Outliner::new(options).outline_file(path)
}

/// Build the outline of an in-memory PDF.
///
/// `source_name` is used for the fallback title of documents without text.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::outline_bytes;
///
/// let data = std::fs::read("report.pdf").unwrap();
/// let doc = outline_bytes(&data, "report.pdf").unwrap();
/// ```
pub fn outline_bytes(data: &[u8], source_name: &str) -> Result<Document> {
    Outliner::default().outline_bytes(data, source_name)
}

/// Build the outline of already-extracted lines.
pub fn outline_lines(lines: &[TextLine], source_name: &str) -> Document {
    Outliner::default().outline_lines(lines, source_name)
}

/// Convert a PDF file to outline JSON.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = outline_file(path)?;
    render::to_json(&doc, format)
}
