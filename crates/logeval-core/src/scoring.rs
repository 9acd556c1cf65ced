use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{EvalError, Result};
use crate::model::{AccuracyReport, AlignedLabels, ClusterMismatch, Metrics};

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Number of unordered pairs that can be drawn from `n` items.
pub fn pair_count(n: usize) -> u64 {
    let n = n as u64;
    if n > 1 { n * (n - 1) / 2 } else { 0 }
}

/// Positions of every distinct label, in ascending order.
fn group_positions<'a, L, I>(labeled: I) -> HashMap<&'a L, Vec<usize>>
where
    L: Hash + Eq + 'a,
    I: Iterator<Item = (usize, &'a L)>,
{
    let mut groups: HashMap<&L, Vec<usize>> = HashMap::new();
    for (i, label) in labeled {
        groups.entry(label).or_default().push(i);
    }
    groups
}

fn total_pairs<K>(groups: &HashMap<K, Vec<usize>>) -> u64 {
    groups.values().map(|positions| pair_count(positions.len())).sum()
}

// ---------------------------------------------------------------------------
// Per-cluster classification
// ---------------------------------------------------------------------------

/// A failed match keyed by the first line of its parsed cluster.
type RankedMismatch<L> = (usize, ClusterMismatch<L>);

struct ClusterTally<L> {
    accurate_events: u64,
    accurate_pairs: u64,
    mismatches: Vec<RankedMismatch<L>>,
}

impl<L> ClusterTally<L> {
    fn empty() -> Self {
        Self {
            accurate_events: 0,
            accurate_pairs: 0,
            mismatches: Vec::new(),
        }
    }

    fn merge(mut self, mut other: Self) -> Self {
        self.accurate_events += other.accurate_events;
        self.accurate_pairs += other.accurate_pairs;
        self.mismatches.append(&mut other.mismatches);
        self
    }
}

/// Classify one parsed cluster against the ground truth.
///
/// The cluster is accurate when all of its lines share a single ground-truth
/// label and it holds every line carrying that label. Pairs inside each
/// ground-truth sub-group count as accurate either way.
fn classify_cluster<L: Hash + Eq + Clone>(
    predicted: &L,
    positions: &[usize],
    ground_truth: &[L],
    truth_groups: &HashMap<&L, Vec<usize>>,
    debug: bool,
) -> ClusterTally<L> {
    // label -> (lines, first position)
    let mut sub_groups: HashMap<&L, (usize, usize)> = HashMap::new();
    for &i in positions {
        sub_groups.entry(&ground_truth[i]).or_insert((0, i)).0 += 1;
    }

    let mut tally = ClusterTally::empty();
    tally.accurate_pairs = sub_groups.values().map(|&(size, _)| pair_count(size)).sum();

    let exact = match sub_groups.keys().next() {
        Some(label) if sub_groups.len() == 1 => truth_groups
            .get(label)
            .is_some_and(|all| all.len() == positions.len()),
        _ => false,
    };

    if exact {
        tally.accurate_events = positions.len() as u64;
    } else if debug {
        let mut overlapping: Vec<(&L, (usize, usize))> = sub_groups.into_iter().collect();
        overlapping.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
        let first = positions.first().copied().unwrap_or_default();
        tally.mismatches.push((
            first,
            ClusterMismatch {
                predicted: predicted.clone(),
                ground_truth: overlapping.into_iter().map(|(l, _)| l.clone()).collect(),
                lines: positions.len(),
            },
        ));
    }
    tally
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a parsed partition of log lines against the ground truth.
///
/// `ground_truth[i]` and `predicted[i]` must label the same log line. Returns
/// pairwise precision, recall and F-measure together with line-level parsing
/// accuracy. Zero denominators are not trapped: the affected metrics come
/// back as NaN.
///
/// With `debug` set, every parsed cluster that fails to reproduce a
/// ground-truth cluster is traced and returned in
/// [`AccuracyReport::mismatches`], largest first and then in order of the
/// cluster's first line. The metrics do not depend on `debug`.
pub fn score_partitions<L>(
    ground_truth: &[L],
    predicted: &[L],
    debug: bool,
) -> Result<AccuracyReport<L>>
where
    L: Hash + Eq + Clone + Debug + Send + Sync,
{
    let predicted: Vec<Option<&L>> = predicted.iter().map(Some).collect();
    score_present(ground_truth, &predicted, debug)
}

/// Like [`score_partitions`], but the parser may leave lines unassigned.
///
/// A `None` line belongs to no parsed cluster: it adds no parsed pairs, is
/// never accurate, and still counts toward the line total.
pub fn score_with_unassigned<L>(
    ground_truth: &[L],
    predicted: &[Option<L>],
    debug: bool,
) -> Result<AccuracyReport<L>>
where
    L: Hash + Eq + Clone + Debug + Send + Sync,
{
    let predicted: Vec<Option<&L>> = predicted.iter().map(Option::as_ref).collect();
    score_present(ground_truth, &predicted, debug)
}

fn score_present<L>(
    ground_truth: &[L],
    predicted: &[Option<&L>],
    debug: bool,
) -> Result<AccuracyReport<L>>
where
    L: Hash + Eq + Clone + Debug + Send + Sync,
{
    if ground_truth.len() != predicted.len() {
        return Err(EvalError::LengthMismatch {
            ground_truth: ground_truth.len(),
            predicted: predicted.len(),
        });
    }
    if ground_truth.is_empty() {
        return Err(EvalError::EmptyInput);
    }

    let truth_groups = group_positions(ground_truth.iter().enumerate());
    let parsed_groups = group_positions(
        predicted
            .iter()
            .enumerate()
            .filter_map(|(i, label)| label.map(|l| (i, l))),
    );
    let real_pairs = total_pairs(&truth_groups);
    let parsed_pairs = total_pairs(&parsed_groups);

    let mut tally = parsed_groups
        .par_iter()
        .map(|(label, positions)| {
            classify_cluster(*label, positions, ground_truth, &truth_groups, debug)
        })
        .reduce(ClusterTally::empty, ClusterTally::merge);

    let precision = tally.accurate_pairs as f64 / parsed_pairs as f64;
    let recall = tally.accurate_pairs as f64 / real_pairs as f64;
    let f_measure = 2.0 * precision * recall / (precision + recall);
    let accuracy = tally.accurate_events as f64 / ground_truth.len() as f64;

    debug!(
        lines = ground_truth.len(),
        unassigned = predicted.iter().filter(|p| p.is_none()).count(),
        truth_clusters = truth_groups.len(),
        parsed_clusters = parsed_groups.len(),
        real_pairs,
        parsed_pairs,
        accurate_pairs = tally.accurate_pairs,
        "scored partitions"
    );

    tally
        .mismatches
        .sort_by(|(a_first, a), (b_first, b)| b.lines.cmp(&a.lines).then(a_first.cmp(b_first)));
    let mismatches: Vec<ClusterMismatch<L>> =
        tally.mismatches.into_iter().map(|(_, m)| m).collect();
    for m in &mismatches {
        debug!(
            "(parsed_eventId, groundtruth_eventId) = ({:?}, {:?}) failed {} messages",
            m.predicted, m.ground_truth, m.lines
        );
    }

    Ok(AccuracyReport {
        metrics: Metrics {
            precision,
            recall,
            f_measure,
            accuracy,
            real_pairs,
            parsed_pairs,
            accurate_pairs: tally.accurate_pairs,
            accurate_events: tally.accurate_events,
            total_lines: ground_truth.len() as u64,
        },
        mismatches,
    })
}

/// Score loaded records, see [`score_with_unassigned`].
pub fn score_aligned(labels: &AlignedLabels, debug: bool) -> Result<AccuracyReport<String>> {
    let report = score_with_unassigned(&labels.ground_truth(), &labels.predicted(), debug)?;
    Ok(AccuracyReport {
        metrics: report.metrics,
        mismatches: report
            .mismatches
            .into_iter()
            .map(|m| ClusterMismatch {
                predicted: m.predicted.to_string(),
                ground_truth: m.ground_truth.iter().map(|l| l.to_string()).collect(),
                lines: m.lines,
            })
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
