use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::providers::ProviderDescriptor;

pub const DEFAULT_FORWARD_ADDRESS: &str = "track@my.flightyapp.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Processed-flights history. Defaults to the platform data directory.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Extra `CODE,Name` table merged over the embedded airport table.
    #[serde(default)]
    pub airports_file: Option<PathBuf>,
    /// Provider descriptors added to (or replacing by name) the embedded table.
    #[serde(default)]
    pub providers: Vec<ProviderDescriptor>,
    #[serde(default)]
    pub deny_list: DenyListConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub forwarding: ForwardingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            history_file: default_history_file(),
            airports_file: None,
            providers: Vec::new(),
            deny_list: DenyListConfig::default(),
            scoring: ScoringConfig::default(),
            forwarding: ForwardingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn default_history_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flightsift")
        .join("processed_flights.json")
}

/// Additions to the built-in deny lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenyListConfig {
    #[serde(default)]
    pub airport_codes: Vec<String>,
    #[serde(default)]
    pub confirmation_codes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_threshold")]
    pub threshold: i32,
}

fn default_threshold() -> i32 {
    crate::classifier::scoring::DEFAULT_THRESHOLD
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardingConfig {
    #[serde(default = "default_to_address")]
    pub to_address: String,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_to_address() -> String {
    DEFAULT_FORWARD_ADDRESS.to_string()
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            to_address: default_to_address(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
