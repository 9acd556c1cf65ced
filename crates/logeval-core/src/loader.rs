use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::model::{AlignedLabels, EVENT_ID_COLUMN};

/// Number of parsed rows read by a sample evaluation.
pub const DEFAULT_SAMPLE_ROWS: usize = 2000;

/// Cell values read as "no value", following the usual CSV tooling defaults.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How a single table is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Honor `"` quoting. When off, quote characters are ordinary data and
    /// rows may have more or fewer fields than the header.
    pub quoting: bool,
    /// Read at most this many data rows.
    pub row_limit: Option<usize>,
}

impl LoadOptions {
    /// Ground-truth tables: standard quoting, every row.
    pub fn ground_truth() -> Self {
        Self {
            quoting: true,
            row_limit: None,
        }
    }

    /// Parser output: quote characters taken literally.
    pub fn parsed() -> Self {
        Self {
            quoting: false,
            row_limit: None,
        }
    }

    pub fn with_row_limit(mut self, row_limit: Option<usize>) -> Self {
        self.row_limit = row_limit;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::ground_truth()
    }
}

// ---------------------------------------------------------------------------
// Column reading
// ---------------------------------------------------------------------------

fn open_reader(path: &Path, options: &LoadOptions) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .quoting(options.quoting)
        .flexible(!options.quoting)
        .from_reader(file))
}

fn column_index(reader: &mut csv::Reader<File>, path: &Path, column: &str) -> Result<usize> {
    let headers = reader.headers().map_err(|source| EvalError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| EvalError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn cell_value(cell: Option<&str>) -> Option<String> {
    match cell {
        Some(v) if !MISSING_MARKERS.contains(&v) => Some(v.to_string()),
        _ => None,
    }
}

/// Read one named column, in row order. Missing cells come back as `None`.
pub fn read_column(path: &Path, column: &str, options: &LoadOptions) -> Result<Vec<Option<String>>> {
    let mut reader = open_reader(path, options)?;
    let idx = column_index(&mut reader, path, column)?;
    let limit = options.row_limit.unwrap_or(usize::MAX);

    let mut values = Vec::new();
    for record in reader.records().take(limit) {
        let record = record.map_err(|source| EvalError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        values.push(cell_value(record.get(idx)));
    }
    debug!(path = %path.display(), column, rows = values.len(), "read column");
    Ok(values)
}

/// Load the `EventId` columns of a ground-truth table and a parsed table and
/// pair them row by row.
///
/// `row_limit` caps both tables to the same leading rows so that the pairing
/// stays on the same log lines. Ground-truth rows without an id are dropped.
pub fn load_aligned(
    groundtruth: &Path,
    parsed: &Path,
    row_limit: Option<usize>,
) -> Result<AlignedLabels> {
    let truth = read_column(
        groundtruth,
        EVENT_ID_COLUMN,
        &LoadOptions::ground_truth().with_row_limit(row_limit),
    )?;
    let predicted = read_column(
        parsed,
        EVENT_ID_COLUMN,
        &LoadOptions::parsed().with_row_limit(row_limit),
    )?;

    let dropped = truth.iter().filter(|t| t.is_none()).count();
    if dropped > 0 {
        warn!(
            path = %groundtruth.display(),
            dropped,
            "skipping ground truth rows without an event id"
        );
    }
    AlignedLabels::from_columns(truth, predicted)
}

// ---------------------------------------------------------------------------
// Batch manifest
// ---------------------------------------------------------------------------

/// One dataset of a batch benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub dataset: String,
    pub groundtruth: PathBuf,
    pub parsed: PathBuf,
}

/// Read a `dataset,groundtruth,parsed` manifest. Relative paths are resolved
/// against the manifest's directory.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let mut reader = open_reader(path, &LoadOptions::ground_truth())?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let mut entries = Vec::new();
    for row in reader.deserialize::<ManifestEntry>() {
        let mut entry = row.map_err(|source| EvalError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.dataset.is_empty() {
            return Err(EvalError::Manifest(format!(
                "row {} has an empty dataset name",
                entries.len() + 1
            )));
        }
        entry.groundtruth = base.join(&entry.groundtruth);
        entry.parsed = base.join(&entry.parsed);
        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(EvalError::Manifest(format!(
            "{} lists no datasets",
            path.display()
        )));
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
