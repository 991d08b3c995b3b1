// src/cohort.rs

use crate::error::ConfigError;
use chrono::format::{Item, StrftimeItems};
use chrono::{TimeZone, Utc};

/// Check a strftime cohort format before any analysis starts. An invalid
/// specifier is a fatal configuration error rather than garbage labels
/// halfway through the run.
pub fn validate_format(format: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(format).any(|item| item == Item::Error) {
        return Err(ConfigError::CohortFormat(format.to_string()));
    }
    Ok(())
}

/// Map a commit timestamp to its cohort label. Pure; the format must have
/// passed `validate_format`.
pub fn classify(timestamp: i64, format: &str) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format(format).to_string(),
        // Out-of-range timestamps cannot come from git2, but a stable
        // fallback label beats a panic.
        None => String::from("unknown"),
    }
}
