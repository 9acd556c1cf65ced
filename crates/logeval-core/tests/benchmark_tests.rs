use logeval_core::loader::load_aligned;
use logeval_core::report::{summary_line, to_csv};
use logeval_core::{EvalError, EvalOptions, evaluate, evaluate_agreement, evaluate_batch, evaluate_with};

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_path(dataset: &str, file: &str) -> PathBuf {
    fixtures_dir().join(dataset).join(file)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn test_hdfs_alignment_skips_unlabeled_line() {
    let aligned = load_aligned(
        &fixture_path("hdfs", "groundtruth.csv"),
        &fixture_path("hdfs", "parsed.csv"),
        None,
    )
    .unwrap();
    assert_eq!(aligned.len(), 12);
    let last = aligned.lines().last().unwrap();
    assert_eq!(last.line_index, 11);
    assert_eq!(last.ground_truth, "E9");
    assert_eq!(last.predicted.as_deref(), Some("c3e85b17"));
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[test]
fn test_hdfs_scores() {
    let evaluation = evaluate(
        &fixture_path("hdfs", "groundtruth.csv"),
        &fixture_path("hdfs", "parsed.csv"),
    )
    .unwrap();
    let m = evaluation.metrics;
    assert_eq!(m.total_lines, 12);
    assert_eq!(m.real_pairs, 10);
    assert_eq!(m.parsed_pairs, 18);
    assert_eq!(m.accurate_pairs, 9);
    assert_eq!(m.accurate_events, 4);
    assert!(approx(m.precision, 0.5));
    assert!(approx(m.recall, 0.9));
    assert!(approx(evaluation.f_measure(), 0.9 / 1.4));
    assert!(approx(evaluation.accuracy(), 4.0 / 12.0));
    assert_eq!(
        summary_line(&m),
        "Precision: 0.5000, Recall: 0.9000, F1_measure: 0.6429, Parsing_Accuracy: 0.3333"
    );
}

#[test]
fn test_hdfs_debug_lists_failed_clusters() {
    let options = EvalOptions {
        row_limit: None,
        debug: true,
    };
    let evaluation = evaluate_with(
        &fixture_path("hdfs", "groundtruth.csv"),
        &fixture_path("hdfs", "parsed.csv"),
        &options,
    )
    .unwrap();

    assert_eq!(evaluation.mismatches.len(), 3);
    let merged = &evaluation.mismatches[0];
    assert_eq!(merged.predicted, "c3e85b17");
    assert_eq!(merged.lines, 6);
    let mut truth = merged.ground_truth.clone();
    truth.sort();
    assert_eq!(truth, vec!["E11".to_string(), "E9".to_string()]);

    // Equal-sized clusters follow the order of their first line.
    let split: Vec<&str> = evaluation.mismatches[1..]
        .iter()
        .map(|m| m.predicted.as_str())
        .collect();
    assert_eq!(split, vec!["d4406a3c", "e5c2f901"]);
    assert!(
        evaluation.mismatches[1..]
            .iter()
            .all(|m| m.ground_truth == vec!["E26".to_string()] && m.lines == 1)
    );
}

#[test]
fn test_ground_truth_against_itself() {
    let truth = fixture_path("hdfs", "groundtruth.csv");
    let evaluation = evaluate(&truth, &truth).unwrap();
    assert_eq!(evaluation.metrics.precision, 1.0);
    assert_eq!(evaluation.metrics.recall, 1.0);
    assert_eq!(evaluation.f_measure(), 1.0);
    assert_eq!(evaluation.accuracy(), 1.0);
}

#[test]
fn test_row_limit_scores_leading_lines() {
    let options = EvalOptions {
        row_limit: Some(4),
        debug: false,
    };
    let evaluation = evaluate_with(
        &fixture_path("hdfs", "groundtruth.csv"),
        &fixture_path("hdfs", "parsed.csv"),
        &options,
    )
    .unwrap();
    assert_eq!(evaluation.metrics.total_lines, 4);
    assert_eq!(evaluation.accuracy(), 1.0);
}

#[test]
fn test_missing_parsed_file() {
    let err = evaluate(
        &fixture_path("hdfs", "groundtruth.csv"),
        &fixture_path("hdfs", "does_not_exist.csv"),
    )
    .unwrap_err();
    assert!(matches!(err, EvalError::Io { .. }));
    assert!(err.to_string().contains("does_not_exist.csv"));
}

// ---------------------------------------------------------------------------
// Agreement
// ---------------------------------------------------------------------------

#[test]
fn test_hdfs_template_agreement() {
    let agreement = evaluate_agreement(
        &fixture_path("hdfs", "groundtruth.csv"),
        &fixture_path("hdfs", "parsed.csv"),
    )
    .unwrap();
    assert!(approx(agreement, 4.0 / 13.0));
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[test]
fn test_batch_manifest() {
    let results =
        evaluate_batch(&fixtures_dir().join("manifest.csv"), &EvalOptions::default()).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].dataset, "HDFS");
    assert!(approx(results[0].metrics.precision, 0.5));
    assert_eq!(results[1].dataset, "HDFS_reference");
    assert_eq!(results[1].metrics.accuracy, 1.0);

    let csv_out = to_csv(&results).unwrap();
    assert!(csv_out.contains("\"HDFS_reference\""));
}

#[test]
fn test_batch_stops_on_missing_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.csv");
    let truth = fixture_path("hdfs", "groundtruth.csv");
    std::fs::write(
        &manifest,
        format!(
            "dataset,groundtruth,parsed\nHDFS,{},missing.csv\n",
            truth.display()
        ),
    )
    .unwrap();
    let err = evaluate_batch(&manifest, &EvalOptions::default()).unwrap_err();
    assert!(matches!(err, EvalError::Io { .. }));
}
