//! pdfoutline CLI - PDF heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::analysis::detect_language;
use pdfoutline::analysis::rules::top_font_keys;
use pdfoutline::render::{to_json_string, write_json};
use pdfoutline::{
    evaluate_files, list_pdfs, run_batch_with_progress, BatchOptions, ClassifierArtifact,
    DedupPolicy, JsonFormat, LopdfTextLayer, OutlineOptions, Outliner, TextLayer,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Extract title and heading outlines from PDF files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Outline every PDF in a directory, one JSON file per PDF
    Run {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory for the JSON outlines
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        #[command(flatten)]
        outline: OutlineArgs,

        /// Abort on the first failing document
        #[arg(long)]
        strict: bool,
    },

    /// Outline a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        outline: OutlineArgs,
    },

    /// Score predicted outlines against gold outlines
    Eval {
        /// Predicted outline JSON
        #[arg(long, value_name = "FILE")]
        pred: PathBuf,

        /// Gold outline JSON
        #[arg(long, value_name = "FILE")]
        gold: PathBuf,

        /// Write the metrics as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Show text layer information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct OutlineArgs {
    /// Learned classifier artifact
    #[arg(long, value_name = "FILE", env = "PDFOUTLINE_MODEL")]
    model: Option<PathBuf>,

    /// Heading deduplication scope
    #[arg(long, value_enum, default_value = "document")]
    dedup: DedupMode,

    /// Disable the semantic redundancy filter
    #[arg(long)]
    no_semantic_filter: bool,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

impl OutlineArgs {
    fn format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }

    fn outliner(&self) -> Outliner {
        let options = OutlineOptions::new()
            .with_dedup(self.dedup.into())
            .with_semantic_filter(!self.no_semantic_filter)
            .lenient_pages();
        let handle = ClassifierArtifact::load_optional(self.model.as_deref());
        match (&handle, &self.model) {
            (Some(_), Some(path)) => log::info!("Classifier overlay from {}", path.display()),
            _ => log::debug!("Heuristic heading levels only"),
        }
        Outliner::new(options).with_classifier(handle)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DedupMode {
    /// Each heading text once per document
    Document,
    /// Each heading text once per page
    Page,
    /// Keep repeated headings
    Off,
}

impl From<DedupMode> for DedupPolicy {
    fn from(mode: DedupMode) -> Self {
        match mode {
            DedupMode::Document => DedupPolicy::Document,
            DedupMode::Page => DedupPolicy::Page,
            DedupMode::Off => DedupPolicy::Off,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            outline,
            strict,
        } => cmd_run(&input, &output, &outline, strict),
        Commands::File {
            input,
            output,
            outline,
        } => cmd_file(&input, output.as_deref(), &outline),
        Commands::Eval { pred, gold, report } => cmd_eval(&pred, &gold, report.as_deref()),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_run(
    input: &Path,
    output: &Path,
    args: &OutlineArgs,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = list_pdfs(input)?.len();
    let outliner = args.outliner();

    let mut options = BatchOptions::new().with_format(args.format());
    if strict {
        options = options.strict();
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let summary = run_batch_with_progress(&outliner, input, output, &options, |report| {
        let name = report
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some(ref error) = report.error {
            pb.println(format!("{} {}: {}", "Failed".red(), name, error));
        }
        pb.set_message(name);
        pb.inc(1);
    });
    pb.finish_and_clear();
    let summary = summary?;

    println!(
        "{} {} processed, {} ok, {} failed in {:.2}s",
        "Done!".green().bold(),
        summary.processed(),
        summary.succeeded(),
        summary.failed(),
        summary.elapsed.as_secs_f64()
    );
    if summary.exceeded_target() {
        println!(
            "{} over the {:.0}s runtime target",
            "Warning:".yellow().bold(),
            summary.runtime_target.as_secs_f64()
        );
    }
    println!("{} {}", "Output:".bold(), output.display());

    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    args: &OutlineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = args.outliner().outline_file(input)?;

    if let Some(path) = output {
        write_json(path, &doc, args.format())?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", to_json_string(&doc, args.format())?);
    }

    Ok(())
}

fn cmd_eval(
    pred: &Path,
    gold: &Path,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = evaluate_files(pred, gold)?;

    println!("{}", "Outline Evaluation".cyan().bold());
    println!("{}", "─".repeat(48).dimmed());
    let header = format!("{:<8}{:>10}{:>10}{:>10}", "Level", "Precision", "Recall", "F1");
    println!("{}", header.bold());
    for (level, metrics) in report.levels() {
        println!(
            "{:<8}{:>10.3}{:>10.3}{:>10.3}",
            level.as_str(),
            metrics.precision,
            metrics.recall,
            metrics.f1
        );
    }
    println!("{}", "─".repeat(48).dimmed());
    println!("{}: {:.3}", "Macro F1".bold(), report.macro_f1);

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("{} {}", "Saved to".green(), path.display());
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let layer = LopdfTextLayer::open(input)?;
    let outliner = Outliner::new(OutlineOptions::new().lenient_pages());
    let lines = outliner.lines(&layer)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), layer.version());
    println!("{}: {}", "Pages".bold(), layer.page_count());

    println!();
    println!("{}", "Text Layer".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Lines".bold(), lines.len());
    match detect_language(&lines) {
        Ok(language) => println!("{}: {}", "Language".bold(), language),
        Err(e) => println!("{}: {}", "Language".bold(), format!("unknown ({})", e).dimmed()),
    }

    let sizes: Vec<String> = top_font_keys(&lines, 5)
        .iter()
        .rev()
        .map(|key| format!("{:.1}", *key as f64 / 10.0))
        .collect();
    if !sizes.is_empty() {
        println!("{}: {}", "Largest fonts".bold(), sizes.join(", "));
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: &str = r#"{
  "title": "Annual Report  ",
  "outline": [
    { "level": "H1", "text": "1. Introduction", "page": 1 },
    { "level": "H2", "text": "Scope", "page": 2 }
  ]
}"#;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "pdfoutline",
            "run",
            "in",
            "out",
            "--dedup",
            "page",
            "--no-semantic-filter",
            "--compact",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                outline, strict, ..
            } => {
                assert!(strict);
                assert!(outline.no_semantic_filter);
                assert_eq!(outline.format(), JsonFormat::Compact);
                assert_eq!(DedupPolicy::from(outline.dedup), DedupPolicy::Page);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_missing_model_gives_heuristic_outliner() {
        let dir = tempfile::tempdir().unwrap();
        let args = OutlineArgs {
            model: Some(dir.path().join("absent.bin")),
            dedup: DedupMode::Document,
            no_semantic_filter: false,
            compact: false,
        };
        assert!(!args.outliner().has_classifier());
    }

    #[test]
    fn test_eval_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let pred = dir.path().join("pred.json");
        let gold = dir.path().join("gold.json");
        let report = dir.path().join("report.json");
        fs::write(&pred, OUTLINE).unwrap();
        fs::write(&gold, OUTLINE).unwrap();

        cmd_eval(&pred, &gold, Some(&report)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(value["macro_f1"], 1.0);
        assert_eq!(value["H2"]["tp"], 1);
    }

    #[test]
    fn test_run_on_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = OutlineArgs {
            model: None,
            dedup: DedupMode::Off,
            no_semantic_filter: true,
            compact: true,
        };
        assert!(cmd_run(&dir.path().join("missing"), &dir.path().join("out"), &args, false).is_err());
    }
}
