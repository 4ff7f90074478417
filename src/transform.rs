use anyhow::{Context, Result};
use log::debug;
use std::fs;

use crate::activity::{self, NO_ACTIVITY};
use crate::config::TransformConfig;
use crate::data_loading;
use crate::error::PipelineError;
use crate::features;
use crate::output;

/// Run the per-subject transformation stage: five raw sensor CSVs plus the
/// annotation timeline in, one single-row feature Parquet file out.
pub fn run(config: &TransformConfig) -> Result<()> {
    if !config.in_directory.exists() {
        return Err(PipelineError::MissingDirectory(config.in_directory.clone()).into());
    }
    fs::create_dir_all(&config.out_directory).with_context(|| {
        format!(
            "Failed to create directory: {}",
            config.out_directory.display()
        )
    })?;

    let annotation_path = activity::find_annotation_file(&config.in_directory)?;
    let streams = data_loading::load_subject_streams(&config.in_directory)?;
    println!(
        "Loaded {} accelerometer rows from {}",
        streams.acc_len(),
        config.in_directory.display()
    );

    let intervals = activity::read_intervals(&annotation_path)?;
    debug!("Sanitized interval table: {:?}", intervals);
    if intervals.is_empty() {
        println!("No usable annotation rows in {}", annotation_path.display());
    }

    let labels = activity::expand_labels(&intervals, streams.acc_len());
    let covered = labels.iter().filter(|label| **label != NO_ACTIVITY).count();
    println!("Labelled {} of {} accelerometer rows", covered, labels.len());

    let features = features::aggregate(&streams, &intervals)?;
    let path = output::write_feature_record(&features, &config.out_directory)?;
    println!("Written features Parquet file: {}", path.display());
    Ok(())
}
