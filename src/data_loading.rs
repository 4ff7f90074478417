use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

pub const ACC_FILE: &str = "ACC.csv";
pub const HR_FILE: &str = "HR.csv";
pub const EDA_FILE: &str = "EDA.csv";
pub const BVP_FILE: &str = "BVP.csv";
pub const TEMP_FILE: &str = "TEMP.csv";

// Every sensor file starts with two device rows (timestamp, sample rate).
// They are skipped by position; their content is never inspected.
const SENSOR_HEADER_ROWS: usize = 2;

/// The five row-indexed sensor streams of one subject. Streams are
/// independent; only the accelerometer defines the row-index space used
/// for activity labelling.
#[derive(Debug)]
pub struct SensorStreams {
    pub acc_x: Vec<f64>,
    pub acc_y: Vec<f64>,
    pub acc_z: Vec<f64>,
    pub heart_rate: Vec<f64>,
    pub eda: Vec<f64>,
    pub bvp: Vec<f64>,
    pub temperature: Vec<f64>,
}

impl SensorStreams {
    pub fn acc_len(&self) -> usize {
        self.acc_x.len()
    }
}

/// Load all five sensor streams for one subject. All five files must exist
/// before any parsing starts; a missing file fails the whole subject, with
/// no partial result.
pub fn load_subject_streams(dir: &Path) -> Result<SensorStreams> {
    let acc_path = dir.join(ACC_FILE);
    let hr_path = dir.join(HR_FILE);
    let eda_path = dir.join(EDA_FILE);
    let bvp_path = dir.join(BVP_FILE);
    let temp_path = dir.join(TEMP_FILE);

    for path in [&acc_path, &hr_path, &eda_path, &bvp_path, &temp_path] {
        if !path.exists() {
            return Err(PipelineError::MissingFile(path.clone()).into());
        }
    }

    let (acc_x, acc_y, acc_z) = read_three_channel(&acc_path)?;

    Ok(SensorStreams {
        acc_x,
        acc_y,
        acc_z,
        heart_rate: read_single_channel(&hr_path)?,
        eda: read_single_channel(&eda_path)?,
        bvp: read_single_channel(&bvp_path)?,
        temperature: read_single_channel(&temp_path)?,
    })
}

/// Locate a file named `S*{suffix}` in `dir`. Candidates are sorted and the
/// lexicographically-first one wins, so the choice is stable when several
/// match.
pub fn find_subject_file(dir: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    let mut matches = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str() {
            if name.starts_with('S') && name.ends_with(suffix) {
                matches.push(entry.path());
            }
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}

fn read_three_channel(path: &Path) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_three_channel(file).with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_single_channel(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_single_channel(file).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_three_channel<R: Read>(input: R) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if row < SENSOR_HEADER_ROWS {
            continue;
        }
        x.push(parse_field(&record, 0, row)?);
        y.push(parse_field(&record, 1, row)?);
        z.push(parse_field(&record, 2, row)?);
    }
    Ok((x, y, z))
}

fn parse_single_channel<R: Read>(input: R) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if row < SENSOR_HEADER_ROWS {
            continue;
        }
        values.push(parse_field(&record, 0, row)?);
    }
    Ok(values)
}

fn parse_field(record: &csv::StringRecord, column: usize, row: usize) -> Result<f64> {
    let raw = record
        .get(column)
        .with_context(|| format!("row {}: missing column {}", row + 1, column + 1))?;
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("row {}: non-numeric value {:?}", row + 1, raw))
}
