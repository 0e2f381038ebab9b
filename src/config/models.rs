// src/config/models.rs
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::checks::CheckKind;
use crate::config::ConfigError;

/// Fully resolved configuration snapshot.
///
/// Built once at startup (file defaults + environment overrides), validated,
/// then shared read-only. A reload replaces the whole value via an atomic
/// swap; nothing ever mutates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub application: ApplicationConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub checks: ChecksConfig,
    pub probes: ProbesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,
    pub version: String,
    pub environment: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "healthzd".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "production".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub console: ConsoleLogConfig,
    pub file: FileLogConfig,
    /// When true, healthy category verdicts are logged at INFO instead of DEBUG.
    pub log_success_checks: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console: ConsoleLogConfig::default(),
            file: FileLogConfig::default(),
            log_success_checks: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleLogConfig {
    pub level: String,
}

impl Default for ConsoleLogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// File output (rotation, paths) is handled outside this daemon; the level
/// is still part of the resolution surface so `LOG_FILE_LEVEL` keeps working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    pub level: String,
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Boolean combinator applied across one category's probe results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Healthy if at least one target is healthy. Empty target set fails.
    Any,
    /// Healthy iff every target is healthy. Empty target set passes vacuously.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Process name must equal the target exactly.
    Exact,
    /// Target may appear as a substring of the name or command line.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChecksConfig {
    pub ports: PortsConfig,
    pub processes: ProcessesConfig,
    pub http: HttpChecksConfig,
    pub resources: ResourcesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortsConfig {
    pub enabled: bool,
    pub targets: Vec<u16>,
    pub condition: Condition,
    pub timeout_secs: u64,
    /// Host the TCP connect probes target. Inside a container this is
    /// almost always the loopback interface.
    pub host: String,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            targets: vec![8080],
            condition: Condition::All,
            timeout_secs: 2,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl PortsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessesConfig {
    pub enabled: bool,
    pub targets: Vec<String>,
    pub condition: Condition,
    pub match_type: MatchType,
    pub timeout_secs: u64,
}

// Disabled until the operator declares targets: an enabled ANY category
// with zero targets can never be satisfied, and a daemon that reports
// 503 out of the box would mask real failures.
impl Default for ProcessesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            targets: Vec::new(),
            condition: Condition::Any,
            match_type: MatchType::Partial,
            timeout_secs: 2,
        }
    }
}

impl ProcessesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpChecksConfig {
    pub enabled: bool,
    pub targets: Vec<HttpTargetConfig>,
    pub condition: Condition,
    /// Default request timeout; individual targets may override it.
    pub timeout_secs: u64,
}

impl Default for HttpChecksConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            targets: Vec::new(),
            condition: Condition::All,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpTargetConfig {
    pub url: String,
    #[serde(default = "default_http_method")]
    pub method: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    /// Optional substring the response body must contain.
    #[serde(default)]
    pub body_contains: Option<String>,
}

fn default_http_method() -> String {
    "GET".to_string()
}

fn default_expected_status() -> u16 {
    200
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub enabled: bool,
    pub targets: Vec<ResourceTargetConfig>,
    pub condition: Condition,
    pub timeout_secs: u64,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            targets: vec![
                ResourceTargetConfig {
                    kind: ResourceKind::Memory,
                    threshold_percent: 90.0,
                    path: default_disk_path(),
                },
                ResourceTargetConfig {
                    kind: ResourceKind::Disk,
                    threshold_percent: 85.0,
                    path: default_disk_path(),
                },
            ],
            condition: Condition::All,
            timeout_secs: 5,
        }
    }
}

impl ResourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTargetConfig {
    pub kind: ResourceKind,
    pub threshold_percent: f64,
    /// Mount point to measure; only meaningful for `disk`.
    #[serde(default = "default_disk_path")]
    pub path: String,
}

fn default_disk_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Disk,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
            ResourceKind::Disk => "disk",
        }
    }
}

/// Which categories gate each Kubernetes-style probe. Declared in config so
/// deployments can redefine what counts as "alive" vs "ready to serve".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbesConfig {
    pub liveness: Vec<String>,
    pub readiness: Vec<String>,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            liveness: vec!["ports".to_string(), "processes".to_string()],
            readiness: vec![
                "ports".to_string(),
                "processes".to_string(),
                "http".to_string(),
                "resources".to_string(),
            ],
        }
    }
}

pub(crate) fn valid_level(level: &str) -> bool {
    tracing::Level::from_str(level).is_ok()
}

impl Config {
    /// Post-merge validation. Every violation here is fatal at startup;
    /// nothing is masked into a default at evaluation time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation {
                field: "server.host".to_string(),
                message: format!("'{}' is not a valid bind address", self.server.host),
            });
        }

        if !valid_level(&self.logging.console.level) {
            return Err(ConfigError::Validation {
                field: "logging.console.level".to_string(),
                message: format!("unknown log level '{}'", self.logging.console.level),
            });
        }
        if !valid_level(&self.logging.file.level) {
            return Err(ConfigError::Validation {
                field: "logging.file.level".to_string(),
                message: format!("unknown log level '{}'", self.logging.file.level),
            });
        }

        for target in &self.checks.http.targets {
            let url = url::Url::parse(&target.url).map_err(|e| ConfigError::Validation {
                field: "checks.http.targets.url".to_string(),
                message: format!("'{}': {}", target.url, e),
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::Validation {
                    field: "checks.http.targets.url".to_string(),
                    message: format!("'{}': unsupported scheme '{}'", target.url, url.scheme()),
                });
            }
            if reqwest::Method::from_bytes(target.method.as_bytes()).is_err() {
                return Err(ConfigError::Validation {
                    field: "checks.http.targets.method".to_string(),
                    message: format!("'{}' is not a valid HTTP method", target.method),
                });
            }
        }

        for target in &self.checks.resources.targets {
            if !(0.0..=100.0).contains(&target.threshold_percent) {
                return Err(ConfigError::Validation {
                    field: "checks.resources.targets.threshold_percent".to_string(),
                    message: format!(
                        "{} is outside the valid range 0..=100",
                        target.threshold_percent
                    ),
                });
            }
            if target.kind == ResourceKind::Disk && target.path.is_empty() {
                return Err(ConfigError::Validation {
                    field: "checks.resources.targets.path".to_string(),
                    message: "disk target requires a non-empty mount path".to_string(),
                });
            }
        }

        for (probe, categories) in [
            ("liveness", &self.probes.liveness),
            ("readiness", &self.probes.readiness),
        ] {
            for name in categories {
                if name.parse::<CheckKind>().is_err() {
                    return Err(ConfigError::UnknownCategory {
                        probe: probe.to_string(),
                        category: name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
