use anyhow::{Context, Result};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::data_loading::find_subject_file;
use crate::error::PipelineError;

/// Label assigned to every accelerometer row no annotation interval covers.
pub const NO_ACTIVITY: &str = "NO_ACTIVITY";

/// Suffix of the per-subject annotation file (`S*_activity.csv`).
pub const ACTIVITY_SUFFIX: &str = "_activity.csv";

// One column-name row at the top of the annotation file.
const ANNOTATION_HEADER_ROWS: usize = 1;

/// One sanitized annotation row: a trimmed label and the accelerometer row
/// it starts at. The interval table preserves file order, which is not
/// necessarily monotonic in `start_row`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityInterval {
    pub label: String,
    pub start_row: i64,
}

/// Locate this subject's annotation file. Unlike the questionnaire lookup,
/// no match here is fatal for the subject.
pub fn find_annotation_file(dir: &Path) -> Result<PathBuf> {
    find_subject_file(dir, ACTIVITY_SUFFIX)?.ok_or_else(|| {
        PipelineError::NoMatchingFiles {
            pattern: format!("S*{}", ACTIVITY_SUFFIX),
            dir: dir.to_path_buf(),
        }
        .into()
    })
}

/// Read the annotation file into the sanitized interval table.
pub fn read_intervals(path: &Path) -> Result<Vec<ActivityInterval>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_intervals(file).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_intervals<R: Read>(input: R) -> Result<Vec<ActivityInterval>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut intervals = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if row < ANNOTATION_HEADER_ROWS {
            continue;
        }
        let label = record.get(0).unwrap_or("").trim().to_string();
        // Rows whose start_row fails coercion are dropped entirely, never
        // repaired or defaulted.
        match record.get(1).and_then(coerce_start_row) {
            Some(start_row) => intervals.push(ActivityInterval { label, start_row }),
            None => debug!("Dropping annotation row {}: unusable start_row", row + 1),
        }
    }
    Ok(intervals)
}

/// Integer strings parse directly; float strings are accepted and truncated
/// toward zero; anything else (including NaN and infinities) is dropped.
fn coerce_start_row(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value as i64),
        _ => None,
    }
}

/// Expand the sanitized interval table into one label per accelerometer row.
///
/// Every row index in `[0, n)` receives exactly one label, `NO_ACTIVITY`
/// unless some interval covers it. Each interval runs from its own start
/// row to the next interval's start row; the last interval extends to the
/// end of the stream regardless of any end the file may claim. Inverted,
/// empty, or out-of-range intervals contribute zero rows; none of this is
/// an error, and the function is total for any interval table and any `n`.
pub fn expand_labels<'a>(intervals: &'a [ActivityInterval], n: usize) -> Vec<&'a str> {
    let mut labels = vec![NO_ACTIVITY; n];
    let last = match intervals.last() {
        // Unusable annotation data: every row stays NO_ACTIVITY.
        None => return labels,
        Some(last) => last,
    };

    for pair in intervals.windows(2) {
        let start = effective_row(pair[0].start_row, n);
        let end = effective_row(pair[1].start_row, n);
        if start < end {
            labels[start..end].fill(pair[0].label.as_str());
        }
    }

    let start = effective_row(last.start_row, n);
    labels[start..].fill(last.label.as_str());

    labels
}

// Clamp a raw start row into [0, n]; the file may carry negative,
// float-truncated, or beyond-stream values.
fn effective_row(row: i64, n: usize) -> usize {
    row.clamp(0, n as i64) as usize
}
