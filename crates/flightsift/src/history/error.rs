//! History store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading or writing the processed-flights history.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// The file exists but is not a valid history document.
    #[error(
        "History file '{path}' is corrupt: {source}. Reset it or investigate before running again"
    )]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file was written by a newer version.
    #[error("History file '{path}' has unsupported version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },

    /// Failed to read the history file.
    #[error("Failed to read history file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or replace the history file.
    #[error("Failed to write history file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode the history document.
    #[error("Failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl HistoryError {
    /// The persisted state cannot be trusted. The caller must not carry on
    /// as if the history were empty.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            HistoryError::Corrupt { .. } | HistoryError::UnsupportedVersion { .. }
        )
    }
}
