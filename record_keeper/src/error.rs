//! Error types for the record stores.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, mutating or persisting a record store.
///
/// Lookups that miss are not errors; they report through their return value
/// (`false` / `0`).
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file exists but could not be read or written
    #[error("I/O error on record file {}: {source}", .path.display())]
    Io {
        /// The backing file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON array of records
    #[error("malformed record file {}: {source}", .path.display())]
    Malformed {
        /// The backing file path
        path: PathBuf,
        /// Parse error with line and column
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory collection could not be serialized
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A required input field was empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A task status string that is neither `pending` nor `completed`
    #[error("unknown task status '{0}' (expected 'pending' or 'completed')")]
    InvalidStatus(String),
}

impl StoreError {
    /// True for errors caused by user input rather than the backing file.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidStatus(_))
    }
}

/// Result alias used throughout the store modules.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Returns the trimmed value, or `MissingField` when nothing is left.
pub(crate) fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StoreError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
