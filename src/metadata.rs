use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::config::MetadataConfig;
use crate::data_loading::find_subject_file;
use crate::error::PipelineError;

/// File name of the per-subject metadata envelope.
pub const METADATA_FILE: &str = "ei-metadata.json";

/// Suffix of the per-subject questionnaire file (`S*_quest.csv`).
pub const QUEST_SUFFIX: &str = "_quest.csv";

const ENVELOPE_VERSION: u32 = 1;

/// Versioned wrapper around the questionnaire-derived key/value mapping.
/// Ordered map so the serialized envelope is byte-stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEnvelope {
    pub version: u32,
    pub action: String,
    pub metadata: BTreeMap<String, String>,
}

impl MetadataEnvelope {
    pub fn add(metadata: BTreeMap<String, String>) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            action: "add".to_string(),
            metadata,
        }
    }
}

/// Run the metadata extraction stage for one subject directory.
///
/// A subject without a questionnaire file is not an error: the stage emits
/// an envelope with an empty mapping and the subject simply combines
/// without extra columns later.
pub fn run(config: &MetadataConfig) -> Result<()> {
    if !config.in_directory.exists() {
        return Err(PipelineError::MissingDirectory(config.in_directory.clone()).into());
    }
    fs::create_dir_all(&config.out_directory).with_context(|| {
        format!(
            "Failed to create directory: {}",
            config.out_directory.display()
        )
    })?;

    let metadata = match find_subject_file(&config.in_directory, QUEST_SUFFIX)? {
        Some(quest_path) => {
            println!("Reading metadata from {}", quest_path.display());
            let mut metadata = read_quest_metadata(&quest_path)?;
            ensure_subject_id(&mut metadata, &config.in_directory);
            metadata
        }
        None => {
            println!("No quest files found for metadata extraction.");
            BTreeMap::new()
        }
    };

    let envelope = MetadataEnvelope::add(metadata);
    let path = config.out_directory.join(METADATA_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    serde_json::to_writer(file, &envelope)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Written metadata file: {}", path.display());
    Ok(())
}

fn read_quest_metadata(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_quest_metadata(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Collect key/value pairs from every comment line of a questionnaire file.
/// Later occurrences of a key overwrite earlier ones.
fn parse_quest_metadata<R: Read>(input: R) -> Result<BTreeMap<String, String>> {
    let mut metadata = BTreeMap::new();
    for line in BufReader::new(input).lines() {
        let line = line?;
        if let Some((key, value)) = parse_comment_line(&line) {
            debug!("Extracted metadata - {}: {}", key, value);
            metadata.insert(key, value);
        }
    }
    Ok(metadata)
}

/// Parse one questionnaire line of the form `# KEY, value`.
///
/// Only comment lines participate: leading `#`s are stripped, the remainder
/// splits on the first comma, the key is lower-cased with spaces replaced by
/// underscores, and both sides are trimmed. Every other line shape returns
/// `None`.
pub fn parse_comment_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if !trimmed.starts_with('#') {
        return None;
    }
    let body = trimmed.trim_start_matches('#').trim();
    let (key, value) = body.split_once(',')?;
    let key = key.trim().to_lowercase().replace(' ', "_");
    let value = value.trim().to_string();
    Some((key, value))
}

/// Guarantee a `subject_id` key, defaulting to the subject directory name
/// when the questionnaire never stated one.
fn ensure_subject_id(metadata: &mut BTreeMap<String, String>, subject_dir: &Path) {
    if metadata.contains_key("subject_id") {
        return;
    }
    let subject_id = subject_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("Added subject_id: {}", subject_id);
    metadata.insert("subject_id".to_string(), subject_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(key: &str, value: &str) -> Option<(String, String)> {
        Some((key.to_string(), value.to_string()))
    }

    #[test]
    fn comment_lines_become_lower_snake_pairs() {
        assert_eq!(parse_comment_line("# AGE, 27"), pair("age", "27"));
        assert_eq!(parse_comment_line("# Subject ID, S5"), pair("subject_id", "S5"));
        assert_eq!(parse_comment_line("#SKIN, 3"), pair("skin", "3"));
    }

    #[test]
    fn repeated_hash_marks_are_stripped() {
        assert_eq!(
            parse_comment_line("## DOMINANT HAND, left"),
            pair("dominant_hand", "left")
        );
    }

    #[test]
    fn value_keeps_everything_after_the_first_comma() {
        assert_eq!(
            parse_comment_line("# SPORT, cycling, soccer"),
            pair("sport", "cycling, soccer")
        );
    }

    #[test]
    fn non_comment_and_comma_less_lines_are_ignored() {
        assert_eq!(parse_comment_line("AGE, 27"), None);
        assert_eq!(parse_comment_line("# no separator here"), None);
        assert_eq!(parse_comment_line(""), None);
        assert_eq!(parse_comment_line("#"), None);
    }

    #[test]
    fn quest_parsing_collects_only_comment_lines() {
        let raw = "# Subject ID, S3\n\
                   # AGE, 31\n\
                   How did you feel today?\n\
                   fine,really\n\
                   # GENDER, f\n";
        let metadata = parse_quest_metadata(raw.as_bytes()).unwrap();
        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata["subject_id"], "S3");
        assert_eq!(metadata["age"], "31");
        assert_eq!(metadata["gender"], "f");
    }

    #[test]
    fn later_duplicate_keys_overwrite_earlier_ones() {
        let raw = "# AGE, 27\n# AGE, 28\n";
        let metadata = parse_quest_metadata(raw.as_bytes()).unwrap();
        assert_eq!(metadata["age"], "28");
    }

    #[test]
    fn subject_id_defaults_from_directory_name() {
        let mut metadata = BTreeMap::new();
        metadata.insert("age".to_string(), "27".to_string());
        ensure_subject_id(&mut metadata, Path::new("/data/PPG_FieldStudy/S7"));
        assert_eq!(metadata["subject_id"], "S7");
    }

    #[test]
    fn stated_subject_id_is_never_replaced() {
        let mut metadata = BTreeMap::new();
        metadata.insert("subject_id".to_string(), "S9".to_string());
        ensure_subject_id(&mut metadata, Path::new("/data/S1"));
        assert_eq!(metadata["subject_id"], "S9");
    }
}
