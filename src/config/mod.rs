// src/config/mod.rs
mod env;
mod error;
mod models;

pub use env::{apply_overrides, EnvOverride, OVERRIDES};
pub use error::ConfigError;
pub use models::*;

use std::path::Path;

use tracing::{info, warn};

/// Resolve the effective configuration: file defaults merged with
/// environment overrides, then validated.
///
/// A missing file is not fatal (the documented defaults apply, as they
/// would in a scratch container without a mounted config). A file that
/// exists but does not parse, a malformed override value, or a failed
/// validation all are: the caller exits non-zero without binding.
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    let mut config = if path.exists() {
        let contents = tokio::fs::read_to_string(path).await?;
        let config = parse_config(path, &contents)?;
        info!(path = %path.display(), "configuration file loaded");
        config
    } else {
        warn!(path = %path.display(), "configuration file not found, using defaults");
        Config::default()
    };

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    config.validate()?;
    Ok(config)
}

/// Parse file contents as YAML or JSON based on the file extension.
fn parse_config(path: &Path, contents: &str) -> Result<Config, ConfigError> {
    let ext = path.extension().and_then(|s| s.to_str());
    if ext == Some("json") {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    } else {
        serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
