//! Shared fixtures: synthetic PDFs and an in-memory text layer.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use pdfoutline::{PageWords, Result, TextLayer, Word};

/// One `Tj` run on a page. `bold` selects Helvetica-Bold.
#[derive(Debug, Clone, Copy)]
pub struct Run {
    pub text: &'static str,
    pub size: f32,
    pub y: f32,
    pub bold: bool,
}

pub fn run(text: &'static str, size: f32, y: f32) -> Run {
    Run {
        text,
        size,
        y,
        bold: false,
    }
}

pub fn bold(text: &'static str, size: f32, y: f32) -> Run {
    Run {
        text,
        size,
        y,
        bold: true,
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Builds a PDF with Helvetica fonts and one content stream per page.
pub fn build_pdf(pages: &[Vec<Run>]) -> Vec<u8> {
    let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
    let mut offsets: BTreeMap<usize, usize> = BTreeMap::new();

    let mut object = |out: &mut Vec<u8>, id: usize, body: String| {
        offsets.insert(id, out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    };

    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + i * 2).collect();
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();

    object(&mut out, 1, "<< /Type /Catalog /Pages 2 0 R >>".to_string());
    object(
        &mut out,
        2,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
    );
    object(
        &mut out,
        3,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );
    object(
        &mut out,
        4,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    );

    for (page, runs) in page_ids.iter().zip(pages) {
        let content: String = runs
            .iter()
            .map(|r| {
                format!(
                    "BT /{} {} Tf 72 {} Td ({}) Tj ET\n",
                    if r.bold { "F2" } else { "F1" },
                    r.size,
                    r.y,
                    escape(r.text)
                )
            })
            .collect();

        object(
            &mut out,
            *page,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page + 1
            ),
        );
        object(
            &mut out,
            page + 1,
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
        );
    }

    let size = offsets.len() + 1;
    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", size).as_bytes());
    for offset in offsets.values() {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            size, xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Writes [`build_pdf`] output to `path`.
pub fn write_pdf(path: &Path, pages: &[Vec<Run>]) {
    std::fs::write(path, build_pdf(pages)).unwrap();
}

/// A two-page report with a title, numbered sections and body text.
pub fn report_pages() -> Vec<Vec<Run>> {
    vec![
        vec![
            bold("Annual Water Quality Report", 24.0, 720.0),
            bold("1. Introduction", 16.0, 660.0),
            run("This report describes the sampling results of the year.", 10.0, 630.0),
            run("Samples were taken monthly at every station.", 10.0, 615.0),
        ],
        vec![
            bold("2. Methods", 16.0, 720.0),
            bold("Sampling Network Design", 16.0, 690.0),
            run("Stations were chosen along the main river channel.", 10.0, 660.0),
            bold("2.1.1 Laboratory Analysis", 16.0, 630.0),
            run("All samples were analysed within two days.", 10.0, 600.0),
        ],
    ]
}

/// Text layer built from word lists, for tests that bypass PDF parsing.
#[derive(Debug, Default)]
pub struct MemoryLayer {
    pages: Vec<PageWords>,
}

impl MemoryLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page whose lines are `(text, size, top)`; each line's words are
    /// laid out left to right.
    pub fn page(mut self, lines: &[(&str, f32, f32)]) -> Self {
        let number = self.pages.len() as u32 + 1;
        let mut page = PageWords::new(number, 792.0);
        for (text, size, top) in lines {
            let mut x = 72.0;
            for token in text.split_whitespace() {
                page.push(Word::new(token, x, *top, top + size, *size, "Helvetica"));
                x += token.chars().count() as f32 * size * 0.5 + size * 0.25;
            }
        }
        self.pages.push(page);
        self
    }
}

impl TextLayer for MemoryLayer {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_words(&self, page: u32) -> Result<PageWords> {
        self.pages
            .get(page.wrapping_sub(1) as usize)
            .cloned()
            .ok_or(pdfoutline::Error::PageOutOfRange(page, self.pages.len() as u32))
    }
}
