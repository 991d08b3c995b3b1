// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems, surfaced before any analysis starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid cohort date format '{0}'")]
    CohortFormat(String),

    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

/// A single file could not be attributed at a snapshot (missing path,
/// binary content, unreadable blob). Never fatal: the analyzer logs it
/// and carries on with an empty histogram for that file.
#[derive(Debug, Error)]
#[error("attribution failed for '{path}' at {snapshot}: {source}")]
pub struct AttributionError {
    pub path: PathBuf,
    pub snapshot: git2::Oid,
    #[source]
    pub source: git2::Error,
}
