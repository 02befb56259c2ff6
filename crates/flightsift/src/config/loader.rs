use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::providers::ProviderTable;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let mut names = HashSet::new();
    for provider in &config.providers {
        if !names.insert(provider.name.to_lowercase()) {
            return Err(ConfigError::InvalidProvider {
                name: provider.name.clone(),
                reason: "Duplicate provider name".to_string(),
            });
        }
    }

    // Compiling the merged table checks every custom regex.
    ProviderTable::with_extra(&config.providers)?;

    for code in &config.deny_list.airport_codes {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation {
                message: format!("Denied airport code '{}' must be three letters", code),
            });
        }
    }

    for code in &config.deny_list.confirmation_codes {
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation {
                message: format!(
                    "Denied confirmation code '{}' must be six letters or digits",
                    code
                ),
            });
        }
    }

    if config.history_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation {
            message: "history_file must not be empty".to_string(),
        });
    }

    Ok(())
}
