use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::loader::{DEFAULT_SAMPLE_ROWS, LoadOptions, load_aligned, read_column, read_manifest};
use crate::model::{DatasetResult, EVENT_TEMPLATE_COLUMN, Evaluation};
use crate::report::summary_line;
use crate::scoring::score_aligned;

/// Options shared by the evaluation entry points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Only read this many leading rows of each table.
    pub row_limit: Option<usize>,
    /// Record failed cluster matches.
    pub debug: bool,
}

impl EvalOptions {
    /// Options for a sample run over the first [`DEFAULT_SAMPLE_ROWS`] rows.
    pub fn sample() -> Self {
        Self {
            row_limit: Some(DEFAULT_SAMPLE_ROWS),
            debug: false,
        }
    }
}

/// Score a parsed structured log against its ground truth.
pub fn evaluate(groundtruth: &Path, parsedresult: &Path) -> Result<Evaluation> {
    evaluate_with(groundtruth, parsedresult, &EvalOptions::default())
}

/// Like [`evaluate`], but only the first [`DEFAULT_SAMPLE_ROWS`] parsed rows
/// (and the matching ground-truth rows) are compared.
pub fn evaluate_sample(groundtruth: &Path, parsedresult: &Path) -> Result<Evaluation> {
    evaluate_with(groundtruth, parsedresult, &EvalOptions::sample())
}

pub fn evaluate_with(
    groundtruth: &Path,
    parsedresult: &Path,
    options: &EvalOptions,
) -> Result<Evaluation> {
    let aligned = load_aligned(groundtruth, parsedresult, options.row_limit)?;
    let report = score_aligned(&aligned, options.debug)?;
    debug!(
        groundtruth = %groundtruth.display(),
        parsed = %parsedresult.display(),
        "{}",
        summary_line(&report.metrics)
    );
    Ok(Evaluation {
        metrics: report.metrics,
        mismatches: report.mismatches,
    })
}

/// Fraction of rows whose `EventTemplate` is identical in both files,
/// compared position by position over the shorter file.
///
/// Missing templates never count as a match. Two empty files give NaN.
pub fn evaluate_agreement(file_1: &Path, file_2: &Path) -> Result<f64> {
    let templates_1 = read_column(file_1, EVENT_TEMPLATE_COLUMN, &LoadOptions::ground_truth())?;
    let templates_2 = read_column(file_2, EVENT_TEMPLATE_COLUMN, &LoadOptions::ground_truth())?;
    let max_len = templates_1.len().min(templates_2.len());

    let count = templates_1
        .iter()
        .zip(&templates_2)
        .filter(|(a, b)| a.is_some() && a == b)
        .count();
    debug!(compared = max_len, matching = count, "template agreement");
    Ok(count as f64 / max_len as f64)
}

/// Evaluate every dataset listed in a manifest, in manifest order.
pub fn evaluate_batch(manifest: &Path, options: &EvalOptions) -> Result<Vec<DatasetResult>> {
    let entries = read_manifest(manifest)?;
    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        debug!(dataset = %entry.dataset, "evaluating dataset");
        let evaluation = evaluate_with(&entry.groundtruth, &entry.parsed, options)?;
        results.push(DatasetResult {
            dataset: entry.dataset,
            metrics: evaluation.metrics,
        });
    }
    Ok(results)
}
