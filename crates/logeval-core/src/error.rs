//! Error types for logeval.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while loading or scoring parsing results.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid CSV.
    #[error("malformed csv in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the header row.
    #[error("missing column `{column}` in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Ground truth and parsed labels do not describe the same log lines.
    #[error("length mismatch: {ground_truth} ground truth lines vs {predicted} parsed lines")]
    LengthMismatch { ground_truth: usize, predicted: usize },

    /// Records are not in ascending line order.
    #[error("line {next} follows line {previous}; lines must be strictly increasing")]
    UnorderedLines { previous: usize, next: usize },

    /// Nothing to score.
    #[error("no log lines to evaluate")]
    EmptyInput,

    /// Batch manifest problem.
    #[error("invalid manifest: {0}")]
    Manifest(String),
}
