//! Batch pipeline turning raw PPG-DaLiA wearable recordings into a combined
//! Parquet corpus.
//!
//! Three independent stages, one subcommand each:
//! - `transform` reduces one subject's sensor CSVs and activity annotations
//!   to a single-row feature record (`unified_data.parquet`).
//! - `metadata` extracts questionnaire key/value pairs into a versioned
//!   JSON envelope (`ei-metadata.json`).
//! - `combine` widens every feature record with its sibling envelope and
//!   stacks them into one dataset.

pub mod activity;
pub mod combine;
pub mod config;
pub mod data_loading;
pub mod error;
pub mod features;
pub mod metadata;
pub mod output;
pub mod transform;
