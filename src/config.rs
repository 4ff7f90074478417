use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default name for the combined corpus artifact.
pub const DEFAULT_DATASET_NAME: &str = "combined_dataset.parquet";

/// Transformation pipeline for PPG-DaLiA wearable recordings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transform one subject's sensor CSVs into a single feature record
    Transform(TransformConfig),

    /// Extract questionnaire metadata into an ei-metadata.json envelope
    Metadata(MetadataConfig),

    /// Combine all per-subject feature records into one dataset
    Combine(CombineConfig),
}

/// Configuration for the per-subject transformation stage.
#[derive(Args, Debug, Clone)]
pub struct TransformConfig {
    /// Directory containing the subject's sensor and activity CSV files
    #[arg(long)]
    pub in_directory: PathBuf,

    /// Directory to write unified_data.parquet into (created if absent)
    #[arg(long)]
    pub out_directory: PathBuf,
}

/// Configuration for the metadata extraction stage.
#[derive(Args, Debug, Clone)]
pub struct MetadataConfig {
    /// Directory containing the subject's quest CSV file
    #[arg(long)]
    pub in_directory: PathBuf,

    /// Directory to write ei-metadata.json into (created if absent)
    #[arg(long)]
    pub out_directory: PathBuf,
}

/// Configuration for the corpus combination stage.
#[derive(Args, Debug, Clone)]
pub struct CombineConfig {
    /// Directory tree containing the per-subject Parquet artifacts
    #[arg(long)]
    pub in_directory: PathBuf,

    /// Directory to write the combined dataset into (created if absent)
    #[arg(long)]
    pub out_directory: PathBuf,

    /// File name of the combined dataset
    #[arg(long, default_value = DEFAULT_DATASET_NAME)]
    pub dataset_name: String,
}
