//! logeval: score log parser output against hand-labelled ground truth.
//!
//! # Usage
//!
//! ```bash
//! # Pairwise precision/recall/F1 and parsing accuracy
//! logeval evaluate HDFS_2k.log_structured.csv HDFS_2k_parsed.csv
//!
//! # Only the first 2000 parsed rows, with failed clusters listed
//! logeval evaluate --sample --debug truth.csv parsed.csv
//!
//! # Template agreement between two structured files
//! logeval agreement a.csv b.csv
//!
//! # Every dataset of a benchmark manifest, as CSV
//! logeval batch manifest.csv --format csv --output results.csv
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use logeval_core::model::DatasetResult;
use logeval_core::report::{batch_summary, format_metric, mismatch_line, summary_line, to_csv, to_json};
use logeval_core::{EvalOptions, Evaluation, evaluate_agreement, evaluate_batch, evaluate_with};

#[derive(Parser, Debug)]
#[command(name = "logeval")]
#[command(version)]
#[command(about = "Score log parsing results against ground truth", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log progress at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the EventId columns of a parsed file and its ground truth
    Evaluate {
        /// Structured ground truth CSV
        groundtruth: PathBuf,

        /// Structured parser output CSV
        parsed: PathBuf,

        #[command(flatten)]
        eval: EvalArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fraction of rows whose EventTemplate matches between two files
    Agreement {
        file_1: PathBuf,
        file_2: PathBuf,
    },

    /// Evaluate every dataset listed in a dataset,groundtruth,parsed manifest
    Batch {
        manifest: PathBuf,

        #[command(flatten)]
        eval: EvalArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct EvalArgs {
    /// Only compare the first ROWS lines (2000 if no value is given)
    #[arg(long, value_name = "ROWS", num_args = 0..=1, default_missing_value = "2000")]
    sample: Option<usize>,

    /// List parsed clusters that do not match a ground-truth event
    #[arg(long)]
    debug: bool,
}

impl EvalArgs {
    fn options(&self) -> EvalOptions {
        EvalOptions {
            row_limit: self.sample,
            debug: self.debug,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
    Csv,
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn render_evaluation(evaluation: &Evaluation, parsed: &Path, format: Format) -> anyhow::Result<String> {
    let out = match format {
        Format::Text => {
            let mut lines: Vec<String> = evaluation.mismatches.iter().map(mismatch_line).collect();
            lines.push(summary_line(&evaluation.metrics));
            lines.join("\n")
        }
        Format::Json => serde_json::to_string_pretty(evaluation)?,
        Format::Csv => to_csv(&[DatasetResult {
            dataset: dataset_name(parsed),
            metrics: evaluation.metrics,
        }])?,
    };
    Ok(out)
}

fn render_batch(results: &[DatasetResult], format: Format) -> anyhow::Result<String> {
    let out = match format {
        Format::Text => batch_summary(results),
        Format::Json => to_json(results)?,
        Format::Csv => to_csv(results)?,
    };
    Ok(out)
}

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Evaluate {
            groundtruth,
            parsed,
            eval,
            format,
            output,
        } => {
            let evaluation = evaluate_with(&groundtruth, &parsed, &eval.options())
                .with_context(|| format!("evaluating {}", parsed.display()))?;
            let content = render_evaluation(&evaluation, &parsed, format)?;
            emit(&content, output.as_deref())
        }
        Command::Agreement { file_1, file_2 } => {
            let agreement = evaluate_agreement(&file_1, &file_2).with_context(|| {
                format!("comparing {} with {}", file_1.display(), file_2.display())
            })?;
            emit(&format!("Agreement: {}", format_metric(agreement)), None)
        }
        Command::Batch {
            manifest,
            eval,
            format,
            output,
        } => {
            let results = evaluate_batch(&manifest, &eval.options())
                .with_context(|| format!("running manifest {}", manifest.display()))?;
            tracing::info!("Evaluated {} datasets", results.len());
            let content = render_batch(&results, format)?;
            emit(&content, output.as_deref())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(args)
}
