// src/config/error.rs
use thiserror::Error;

/// Configuration errors are fatal: they abort startup with a non-zero
/// exit before the HTTP listener binds, so orchestrators see a crash
/// instead of a silently broken server.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for environment variable '{var}': {message}")]
    InvalidOverride { var: String, message: String },

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Probe set '{probe}' references unknown check category '{category}'")]
    UnknownCategory { probe: String, category: String },
}
