use std::path::PathBuf;
use thiserror::Error;

pub use crate::history::HistoryError;

#[derive(Error, Debug)]
pub enum FlightsiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Forwarding error: {0}")]
    Forward(#[from] ForwardError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl FlightsiftError {
    /// True when the run stopped because the persisted history could not be
    /// read. The operator decides between a reset and an investigation.
    pub fn is_history_corrupt(&self) -> bool {
        matches!(self, FlightsiftError::History(e) if e.is_corrupt())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid pattern in provider '{provider}': {reason}")]
    InvalidPattern { provider: String, reason: String },

    #[error("Invalid provider '{name}': {reason}")]
    InvalidProvider { name: String, reason: String },

    #[error("Failed to read airport table '{path}': {source}")]
    ReadAirports {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("Forward of booking '{booking}' rejected: {reason}")]
    Rejected { booking: String, reason: String },

    #[error("Forwarding transport failed: {0}")]
    Transport(String),

    #[error("First forward failed, stopping run: {0}")]
    Aborted(String),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to fetch messages: {0}")]
    Fetch(String),

    #[error("Failed to parse message: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, FlightsiftError>;
