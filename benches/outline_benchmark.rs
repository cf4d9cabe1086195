//! Benchmarks for outline extraction.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pdfoutline::analysis::{EmbeddingProvider, HashingEmbedder, RedundancyFilter};
use pdfoutline::{pdf_version, OutlineOptions, Outliner, TextLine};

/// Synthetic document: one numbered section heading and a paragraph of body
/// lines per page.
fn synthetic_lines(pages: u32) -> Vec<TextLine> {
    let mut lines = vec![TextLine::new("Annual Water Quality Report", 24.0, 1).at(40.0)];
    for page in 1..=pages {
        let mut top = 80.0;
        lines.push(TextLine::new(format!("{}. Section Number {}", page, page), 16.0, page).at(top));
        for i in 0..30 {
            top += 14.0;
            lines.push(
                TextLine::new(
                    format!(
                        "Body line {} on page {} with measured values and remarks.",
                        i, page
                    ),
                    10.0,
                    page,
                )
                .at(top),
            );
        }
    }
    lines
}

fn bench_outline_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_lines");

    for pages in [1u32, 10, 50] {
        let lines = synthetic_lines(pages);
        let heuristic = Outliner::new(OutlineOptions::new().with_semantic_filter(false));
        let filtered = Outliner::default();

        group.bench_with_input(BenchmarkId::new("heuristic", pages), &lines, |b, lines| {
            b.iter(|| heuristic.outline_lines(black_box(lines), "bench.pdf"));
        });
        group.bench_with_input(BenchmarkId::new("semantic_filter", pages), &lines, |b, lines| {
            b.iter(|| filtered.outline_lines(black_box(lines), "bench.pdf"));
        });
    }

    group.finish();
}

fn bench_embedding(c: &mut Criterion) {
    let embedder = HashingEmbedder::default();
    c.bench_function("hashing_embed_line", |b| {
        b.iter(|| {
            embedder
                .embed(black_box("2.1.1 Laboratory Analysis of River Samples"))
                .unwrap()
        });
    });

    let lines = synthetic_lines(10);
    let filter = RedundancyFilter::new(Box::new(HashingEmbedder::default()));
    c.bench_function("redundancy_flag_10_pages", |b| {
        b.iter(|| filter.flag(black_box(&lines)).unwrap());
    });
}

fn bench_format_detection(c: &mut Criterion) {
    c.bench_function("detect_pdf_header", |b| {
        b.iter(|| pdf_version(black_box(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3")).unwrap());
    });
}

criterion_group!(
    benches,
    bench_outline_lines,
    bench_embedding,
    bench_format_detection,
);
criterion_main!(benches);
