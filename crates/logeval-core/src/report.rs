use std::fmt::Debug;

use crate::model::{ClusterMismatch, DatasetResult, Metrics};

// ---- Text ----

/// Format a metric like printf's `%.4f`, including `nan`, `inf` and `-inf`.
pub fn format_metric(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{value:.4}")
    }
}

/// The canonical one-line summary of an evaluation.
pub fn summary_line(metrics: &Metrics) -> String {
    format!(
        "Precision: {}, Recall: {}, F1_measure: {}, Parsing_Accuracy: {}",
        format_metric(metrics.precision),
        format_metric(metrics.recall),
        format_metric(metrics.f_measure),
        format_metric(metrics.accuracy),
    )
}

/// Describe a parsed cluster that failed to match the ground truth.
pub fn mismatch_line<L: Debug>(mismatch: &ClusterMismatch<L>) -> String {
    format!(
        "(parsed_eventId, groundtruth_eventId) = ({:?}, {:?}) failed {} messages",
        mismatch.predicted, mismatch.ground_truth, mismatch.lines
    )
}

/// One summary line per dataset, prefixed by its name.
pub fn batch_summary(results: &[DatasetResult]) -> String {
    let width = results.iter().map(|r| r.dataset.len()).max().unwrap_or(0);
    results
        .iter()
        .map(|r| format!("{:<width$}  {}", r.dataset, summary_line(&r.metrics)))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---- Exports ----

/// Pretty-printed JSON. Non-finite metrics are written as `null`.
pub fn to_json(results: &[DatasetResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}

/// CSV with one row per dataset.
///
/// Output includes a UTF-8 BOM, CRLF line endings, and all-quoted fields
/// for spreadsheet compatibility.
pub fn to_csv(results: &[DatasetResult]) -> csv::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .from_writer(vec![]);

    wtr.write_record([
        "dataset",
        "precision",
        "recall",
        "f1_measure",
        "accuracy",
        "real_pairs",
        "parsed_pairs",
        "accurate_pairs",
        "accurate_events",
        "total_lines",
    ])?;
    for r in results {
        let m = &r.metrics;
        wtr.write_record([
            r.dataset.clone(),
            format_metric(m.precision),
            format_metric(m.recall),
            format_metric(m.f_measure),
            format_metric(m.accuracy),
            m.real_pairs.to_string(),
            m.parsed_pairs.to_string(),
            m.accurate_pairs.to_string(),
            m.accurate_events.to_string(),
            m.total_lines.to_string(),
        ])?;
    }

    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    let mut out = String::from("\u{FEFF}");
    out.push_str(&String::from_utf8_lossy(&data));
    Ok(out)
}
