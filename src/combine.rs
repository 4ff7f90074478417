use anyhow::{Context, Result};
use log::debug;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CombineConfig;
use crate::error::PipelineError;
use crate::metadata::{MetadataEnvelope, METADATA_FILE};
use crate::output::UNIFIED_DATA_FILE;

/// Run the corpus combination stage: find every per-subject feature record
/// under the input tree, widen each with its sibling metadata envelope and
/// stack them all into one table.
pub fn run(config: &CombineConfig) -> Result<()> {
    if !config.in_directory.exists() {
        return Err(PipelineError::MissingDirectory(config.in_directory.clone()).into());
    }
    fs::create_dir_all(&config.out_directory).with_context(|| {
        format!(
            "Failed to create directory: {}",
            config.out_directory.display()
        )
    })?;

    let artifacts = find_feature_artifacts(&config.in_directory)?;
    if artifacts.is_empty() {
        return Err(PipelineError::NoMatchingFiles {
            pattern: UNIFIED_DATA_FILE.to_string(),
            dir: config.in_directory.clone(),
        }
        .into());
    }
    println!("Found {} feature records to combine", artifacts.len());

    let mut frames = Vec::with_capacity(artifacts.len());
    for path in &artifacts {
        frames.push(load_widened_record(path)?);
    }

    // Diagonal concatenation unions the metadata columns; subjects missing a
    // key get nulls in that column.
    let mut combined = polars::functions::concat_df_diagonal(&frames)
        .context("Failed to concatenate feature records")?;

    let out_path = config.out_directory.join(&config.dataset_name);
    let file = File::create(&out_path)
        .with_context(|| format!("Failed to create file: {}", out_path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut combined)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    println!(
        "Written combined dataset ({} rows) to {}",
        combined.height(),
        out_path.display()
    );
    Ok(())
}

/// Collect every `unified_data.parquet` under `root`, sorted by path so the
/// combined row order never depends on filesystem enumeration order.
fn find_feature_artifacts(root: &Path) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name().to_str() == Some(UNIFIED_DATA_FILE) {
            artifacts.push(entry.into_path());
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

/// Load one feature record and widen it with the metadata envelope sitting
/// next to it, one constant-valued string column per key. A record without
/// an envelope passes through unchanged.
fn load_widened_record(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut df = ParquetReader::new(file)
        .finish()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let envelope_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(METADATA_FILE);
    if !envelope_path.exists() {
        println!("No metadata found for {}.", path.display());
        return Ok(df);
    }

    let envelope = read_envelope(&envelope_path)?;
    debug!(
        "Widening {} with {} metadata keys",
        path.display(),
        envelope.metadata.len()
    );
    let height = df.height();
    for (key, value) in &envelope.metadata {
        let column = Column::new(key.as_str().into(), vec![value.clone(); height]);
        df.with_column(column)?;
    }
    Ok(df)
}

fn read_envelope(path: &Path) -> Result<MetadataEnvelope> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let envelope = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(envelope)
}
