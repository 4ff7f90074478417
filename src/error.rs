use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline preconditions. Parse failures inside sensor files are not
/// listed here; they propagate as plain errors with file/row context.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("missing required file {}", .0.display())]
    MissingFile(PathBuf),

    #[error("no files matching {pattern} found in {}", .dir.display())]
    NoMatchingFiles { pattern: String, dir: PathBuf },

    #[error("cannot aggregate over empty {0} stream")]
    EmptyStream(&'static str),
}
