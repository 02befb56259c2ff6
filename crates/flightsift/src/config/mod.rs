pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{
    default_history_file, Config, DenyListConfig, ForwardingConfig, LogFormat, LoggingConfig,
    ScoringConfig, DEFAULT_FORWARD_ADDRESS,
};
