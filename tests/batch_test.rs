//! Integration tests for directory batch runs.

mod common;

use std::fs;
use std::time::Duration;

use common::{bold, report_pages, run, write_pdf};
use pdfoutline::{run_batch, run_batch_with_progress, BatchOptions, JsonFormat, Outliner};

#[test]
fn test_batch_writes_one_json_per_pdf() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_pdf(&input.path().join("file01.pdf"), &report_pages());
    write_pdf(
        &input.path().join("file02.PDF"),
        &[vec![
            bold("Safety Data Sheet", 18.0, 720.0),
            run("Handle with gloves at all times.", 10.0, 690.0),
        ]],
    );
    fs::write(input.path().join("notes.txt"), "not a pdf").unwrap();

    let summary = run_batch(
        &Outliner::default(),
        input.path(),
        output.path(),
        &BatchOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.processed(), 2);
    assert_eq!(summary.failed(), 0);
    assert!(output.path().join("file01.json").exists());
    assert!(output.path().join("file02.json").exists());
    assert!(!output.path().join("notes.json").exists());

    let json = fs::read_to_string(output.path().join("file01.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "Annual Water Quality Report 1. Introduction  ");
    assert!(value.get("error").is_none());
}

#[test]
fn test_lenient_batch_writes_placeholder_for_broken_pdf() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_pdf(&input.path().join("a_good.pdf"), &report_pages());
    fs::write(input.path().join("b_broken.pdf"), b"%PDF-1.4\ngarbage").unwrap();
    fs::write(input.path().join("c_html.pdf"), b"<html></html>").unwrap();

    let mut seen = Vec::new();
    let summary = run_batch_with_progress(
        &Outliner::default(),
        input.path(),
        output.path(),
        &BatchOptions::default().with_format(JsonFormat::Compact),
        |report| seen.push(report.source.clone()),
    )
    .unwrap();

    assert_eq!(seen.len(), 3);
    assert_eq!(summary.processed(), 3);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.failed(), 2);

    let broken = fs::read_to_string(output.path().join("b_broken.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&broken).unwrap();
    assert_eq!(value["title"], "");
    assert_eq!(value["outline"], serde_json::json!([]));
    assert!(value["error"].as_str().is_some_and(|e| !e.is_empty()));

    let html = fs::read_to_string(output.path().join("c_html.json")).unwrap();
    assert!(html.starts_with(r#"{"title":"","outline":[],"error":"#));
}

#[test]
fn test_strict_batch_aborts_on_first_failure() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a_broken.pdf"), b"not a pdf at all").unwrap();
    write_pdf(&input.path().join("b_good.pdf"), &report_pages());

    let result = run_batch(
        &Outliner::default(),
        input.path(),
        output.path(),
        &BatchOptions::new().strict(),
    );

    assert!(result.is_err());
    assert!(!output.path().join("a_broken.json").exists());
    assert!(!output.path().join("b_good.json").exists());
}

#[test]
fn test_empty_input_dir_creates_output_dir() {
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("nested").join("out");

    let summary = run_batch(
        &Outliner::default(),
        input.path(),
        &output,
        &BatchOptions::default().with_runtime_target(Duration::from_secs(60)),
    )
    .unwrap();

    assert_eq!(summary.processed(), 0);
    assert!(!summary.exceeded_target());
    assert!(output.is_dir());
}

#[test]
fn test_unwritable_placeholder_does_not_stop_batch() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a_broken.pdf"), b"not a pdf at all").unwrap();
    write_pdf(&input.path().join("b_good.pdf"), &report_pages());
    fs::create_dir(output.path().join("a_broken.json")).unwrap();

    let summary = run_batch(
        &Outliner::default(),
        input.path(),
        output.path(),
        &BatchOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.processed(), 2);
    assert_eq!(summary.failed(), 1);
    let error = summary.reports[0].error.as_deref().unwrap();
    assert!(error.contains("placeholder not written"));
    assert!(output.path().join("a_broken.json").is_dir());
    assert!(output.path().join("b_good.json").is_file());
}
