//! Accuracy metrics for log parsers.
//!
//! A parser assigns every log line an event id; so does a hand-labelled
//! ground truth. [`scoring::score_partitions`] compares the two partitions
//! with pairwise precision, recall and F-measure plus line-level parsing
//! accuracy. [`evaluate`] wraps it for the structured CSV files parsers
//! emit.

pub mod error;
pub mod evaluate;
pub mod loader;
pub mod model;
pub mod report;
pub mod scoring;

pub use error::{EvalError, Result};
pub use evaluate::{
    EvalOptions, evaluate, evaluate_agreement, evaluate_batch, evaluate_sample, evaluate_with,
};
pub use model::{AccuracyReport, AlignedLabels, ClusterMismatch, Evaluation, Metrics};
pub use scoring::{score_partitions, score_with_unassigned};
