//! Batch processing of a directory of PDFs.
//!
//! Documents are processed one after another in file-name order. Each input
//! `name.pdf` produces `name.json` in the output directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::detect::list_pdfs;
use crate::error::Result;
use crate::parser::ErrorMode;
use crate::pipeline::Outliner;
use crate::render::{write_json, FailedDocument, JsonFormat};

/// Default soft time budget for a whole batch.
pub const DEFAULT_RUNTIME_TARGET: Duration = Duration::from_secs(10);

/// Options for batch runs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// `Strict` aborts on the first failing document; `Lenient` writes a
    /// placeholder and continues
    pub error_mode: ErrorMode,

    /// JSON output format
    pub format: JsonFormat,

    /// Soft time budget; exceeding it is logged, never enforced
    pub runtime_target: Duration,
}

impl BatchOptions {
    /// Create new batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Abort on the first failure.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the JSON format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the runtime target.
    pub fn with_runtime_target(mut self, target: Duration) -> Self {
        self.runtime_target = target;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            format: JsonFormat::Pretty,
            runtime_target: DEFAULT_RUNTIME_TARGET,
        }
    }
}

/// Result of one document in a batch.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Outline nodes written (0 for failures)
    pub nodes: usize,
    /// Error message when the document failed
    pub error: Option<String>,
    pub elapsed: Duration,
}

impl DocumentReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub reports: Vec<DocumentReport>,
    pub elapsed: Duration,
    pub runtime_target: Duration,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_success()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.processed() - self.failed()
    }

    pub fn exceeded_target(&self) -> bool {
        self.elapsed > self.runtime_target
    }
}

/// Output path for an input PDF.
pub fn output_path(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Process every PDF in `input_dir`.
pub fn run_batch(
    outliner: &Outliner,
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchSummary> {
    run_batch_with_progress(outliner, input_dir, output_dir, options, |_| {})
}

/// Process every PDF in `input_dir`, reporting each finished document.
pub fn run_batch_with_progress<F>(
    outliner: &Outliner,
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
    mut on_document: F,
) -> Result<BatchSummary>
where
    F: FnMut(&DocumentReport),
{
    fs::create_dir_all(output_dir)?;
    let files = list_pdfs(input_dir)?;
    log::info!(
        "Processing {} PDF file(s) from {}",
        files.len(),
        input_dir.display()
    );

    let start = Instant::now();
    let mut summary = BatchSummary {
        runtime_target: options.runtime_target,
        ..Default::default()
    };

    for source in files {
        let doc_start = Instant::now();
        let output = output_path(output_dir, &source);

        let result = outliner.outline_file(&source).and_then(|doc| {
            write_json(&output, &doc, options.format)?;
            Ok(doc.total_nodes())
        });

        let report = match result {
            Ok(nodes) => {
                log::debug!("{}: {} outline nodes", source.display(), nodes);
                DocumentReport {
                    source,
                    output,
                    nodes,
                    error: None,
                    elapsed: doc_start.elapsed(),
                }
            }
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::error!("Failed to process {}: {}", source.display(), e);
                let mut message = e.to_string();
                if let Err(write_err) = write_json(&output, &FailedDocument::new(&e), options.format)
                {
                    log::error!("Failed to write {}: {}", output.display(), write_err);
                    message = format!("{}; placeholder not written: {}", message, write_err);
                }
                DocumentReport {
                    source,
                    output,
                    nodes: 0,
                    error: Some(message),
                    elapsed: doc_start.elapsed(),
                }
            }
            Err(e) => return Err(e),
        };

        on_document(&report);
        summary.reports.push(report);
    }

    summary.elapsed = start.elapsed();
    if summary.exceeded_target() {
        log::warn!(
            "Batch took {:.2}s, over the {:.0}s target",
            summary.elapsed.as_secs_f64(),
            options.runtime_target.as_secs_f64()
        );
    } else {
        log::info!(
            "Batch finished in {:.2}s ({} ok, {} failed)",
            summary.elapsed.as_secs_f64(),
            summary.succeeded(),
            summary.failed()
        );
    }

    Ok(summary)
}
