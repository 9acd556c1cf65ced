use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Column holding the event (cluster) identifier of each log line.
pub const EVENT_ID_COLUMN: &str = "EventId";
/// Column holding the human-readable event template of each log line.
pub const EVENT_TEMPLATE_COLUMN: &str = "EventTemplate";

/// One log line with the label assigned by the ground truth and by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledLine {
    /// Zero-based data row shared by both tables.
    pub line_index: usize,
    pub ground_truth: String,
    /// `None` when the parser left the line without an event id.
    pub predicted: Option<String>,
}

/// Index-aligned ground truth and parsed labels.
///
/// Records are kept in ascending `line_index` order and each one was built
/// from the same row of both tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignedLabels {
    lines: Vec<LabeledLine>,
}

impl AlignedLabels {
    /// Builds the alignment. Line indices must be strictly increasing.
    pub fn new(lines: Vec<LabeledLine>) -> Result<Self> {
        if let Some(w) = lines
            .windows(2)
            .find(|w| w[0].line_index >= w[1].line_index)
        {
            return Err(EvalError::UnorderedLines {
                previous: w[0].line_index,
                next: w[1].line_index,
            });
        }
        Ok(Self { lines })
    }

    /// Pairs two label columns read from the same row positions. Rows whose
    /// ground-truth label is missing are dropped from both sides; a missing
    /// parsed label stays `None`.
    pub fn from_columns(
        ground_truth: Vec<Option<String>>,
        predicted: Vec<Option<String>>,
    ) -> Result<Self> {
        if ground_truth.len() != predicted.len() {
            return Err(EvalError::LengthMismatch {
                ground_truth: ground_truth.len(),
                predicted: predicted.len(),
            });
        }
        let lines = ground_truth
            .into_iter()
            .zip(predicted)
            .enumerate()
            .filter_map(|(line_index, (truth, parsed))| {
                truth.map(|ground_truth| LabeledLine {
                    line_index,
                    ground_truth,
                    predicted: parsed,
                })
            })
            .collect();
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[LabeledLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn ground_truth(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.ground_truth.as_str()).collect()
    }

    pub fn predicted(&self) -> Vec<Option<&str>> {
        self.lines.iter().map(|l| l.predicted.as_deref()).collect()
    }
}

/// Pairwise clustering metrics plus the counts they were derived from.
///
/// The ratios are plain `f64` divisions and become NaN or infinite when a
/// denominator is zero (e.g. every cluster is a singleton).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
    pub accuracy: f64,
    pub real_pairs: u64,
    pub parsed_pairs: u64,
    pub accurate_pairs: u64,
    pub accurate_events: u64,
    pub total_lines: u64,
}

/// A parsed cluster that does not reproduce a ground-truth cluster exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMismatch<L> {
    /// The parsed event id.
    pub predicted: L,
    /// Ground-truth ids found inside the parsed cluster, largest group first.
    pub ground_truth: Vec<L>,
    /// Number of log lines in the parsed cluster.
    pub lines: usize,
}

/// Scorer output: metrics and, when requested, failed-match diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport<L> {
    pub metrics: Metrics,
    pub mismatches: Vec<ClusterMismatch<L>>,
}

/// Result of evaluating one parsed file against its ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub metrics: Metrics,
    pub mismatches: Vec<ClusterMismatch<String>>,
}

impl Evaluation {
    pub fn f_measure(&self) -> f64 {
        self.metrics.f_measure
    }

    pub fn accuracy(&self) -> f64 {
        self.metrics.accuracy
    }
}

/// One row of a batch benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetResult {
    pub dataset: String,
    pub metrics: Metrics,
}
