// src/config/env.rs
//
// Environment overrides are a declared table of (variable, config path,
// apply function) rather than ad hoc lookups scattered through the loader,
// so the override surface is enumerable and testable. List-valued
// overrides replace the base list wholesale; partial merges would be
// ambiguous.

use crate::config::models::valid_level;
use crate::config::{Config, ConfigError};

type Apply = fn(&mut Config, &str) -> Result<(), String>;

pub struct EnvOverride {
    pub var: &'static str,
    pub path: &'static str,
    apply: Apply,
}

impl EnvOverride {
    pub fn apply(&self, config: &mut Config, raw: &str) -> Result<(), ConfigError> {
        (self.apply)(config, raw).map_err(|message| ConfigError::InvalidOverride {
            var: self.var.to_string(),
            message,
        })
    }
}

pub static OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        var: "APP_NAME",
        path: "application.name",
        apply: set_app_name,
    },
    EnvOverride {
        var: "APP_VERSION",
        path: "application.version",
        apply: set_app_version,
    },
    EnvOverride {
        var: "ENVIRONMENT",
        path: "application.environment",
        apply: set_environment,
    },
    EnvOverride {
        var: "SERVER_HOST",
        path: "server.host",
        apply: set_server_host,
    },
    EnvOverride {
        var: "SERVER_PORT",
        path: "server.port",
        apply: set_server_port,
    },
    EnvOverride {
        var: "LOG_CONSOLE_LEVEL",
        path: "logging.console.level",
        apply: set_console_level,
    },
    EnvOverride {
        var: "LOG_FILE_LEVEL",
        path: "logging.file.level",
        apply: set_file_level,
    },
    EnvOverride {
        var: "CHECK_PORTS",
        path: "checks.ports.targets",
        apply: set_port_targets,
    },
    EnvOverride {
        var: "CHECK_PROCESS_NAMES",
        path: "checks.processes.targets",
        apply: set_process_targets,
    },
];

/// Merge recognized environment variables into `config`.
///
/// The environment is injected as a lookup function so tests can feed a
/// map instead of mutating process-global state. A malformed value is a
/// fatal `ConfigError` naming the offending variable, never skipped.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for entry in OVERRIDES {
        if let Some(raw) = lookup(entry.var) {
            entry.apply(config, &raw)?;
            tracing::debug!(var = entry.var, path = entry.path, "environment override applied");
        }
    }
    Ok(())
}

fn set_app_name(config: &mut Config, raw: &str) -> Result<(), String> {
    config.application.name = raw.to_string();
    Ok(())
}

fn set_app_version(config: &mut Config, raw: &str) -> Result<(), String> {
    config.application.version = raw.to_string();
    Ok(())
}

fn set_environment(config: &mut Config, raw: &str) -> Result<(), String> {
    config.application.environment = raw.to_string();
    Ok(())
}

fn set_server_host(config: &mut Config, raw: &str) -> Result<(), String> {
    config.server.host = raw.to_string();
    Ok(())
}

fn set_server_port(config: &mut Config, raw: &str) -> Result<(), String> {
    config.server.port = parse_port(raw)?;
    Ok(())
}

fn set_console_level(config: &mut Config, raw: &str) -> Result<(), String> {
    config.logging.console.level = parse_level(raw)?;
    Ok(())
}

fn set_file_level(config: &mut Config, raw: &str) -> Result<(), String> {
    config.logging.file.level = parse_level(raw)?;
    Ok(())
}

fn set_port_targets(config: &mut Config, raw: &str) -> Result<(), String> {
    config.checks.ports.targets = parse_csv(raw)?
        .iter()
        .map(|item| parse_port(item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(())
}

fn set_process_targets(config: &mut Config, raw: &str) -> Result<(), String> {
    config.checks.processes.targets = parse_csv(raw)?;
    Ok(())
}

fn parse_port(raw: &str) -> Result<u16, String> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| format!("expected a port number, got '{}'", raw.trim()))
}

fn parse_level(raw: &str) -> Result<String, String> {
    let level = raw.trim().to_lowercase();
    if valid_level(&level) {
        Ok(level)
    } else {
        Err(format!("unknown log level '{}'", raw.trim()))
    }
}

fn parse_csv(raw: &str) -> Result<Vec<String>, String> {
    let items: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Err("expected a non-empty comma-separated list".to_string());
    }
    Ok(items)
}
