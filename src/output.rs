use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::features::SubjectFeatures;

/// File name of the per-subject feature artifact.
pub const UNIFIED_DATA_FILE: &str = "unified_data.parquet";

/// Persist one subject's feature record as a single-row Parquet file and
/// return the path written.
pub fn write_feature_record(features: &SubjectFeatures, out_dir: &Path) -> Result<PathBuf> {
    let mut df = feature_frame(features)?;
    let path = out_dir.join(UNIFIED_DATA_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Lay the feature record out as one DataFrame row. The label list becomes a
/// single `list[str]` cell so the frame height stays 1 even for subjects with
/// many annotated segments.
pub fn feature_frame(features: &SubjectFeatures) -> Result<DataFrame> {
    let labels = Series::new("labels".into(), features.activity_labels.clone());
    let columns = vec![
        Column::new("accX_rms".into(), vec![features.acc_x_rms]),
        Column::new("accY_rms".into(), vec![features.acc_y_rms]),
        Column::new("accZ_rms".into(), vec![features.acc_z_rms]),
        Column::new("heart_rate_mean".into(), vec![features.heart_rate_mean]),
        Column::new("eda_mean".into(), vec![features.eda_mean]),
        Column::new("bvp_mean".into(), vec![features.bvp_mean]),
        Column::new("temperature_mean".into(), vec![features.temperature_mean]),
        Column::new("activity_labels".into(), vec![labels]),
    ];
    Ok(DataFrame::new(columns)?)
}
