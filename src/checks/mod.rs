// src/checks/mod.rs
mod http;
mod port;
mod process;
mod resource;
mod result;

pub use http::HttpChecker;
pub use port::PortChecker;
pub use process::ProcessChecker;
pub use resource::ResourceChecker;
pub use result::ProbeResult;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::config::{HttpTargetConfig, MatchType, ResourceKind, ResourceTargetConfig};

/// The four kinds of liveness signal the daemon knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckKind {
    Ports,
    Processes,
    Http,
    Resources,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Ports,
        CheckKind::Processes,
        CheckKind::Http,
        CheckKind::Resources,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Ports => "ports",
            CheckKind::Processes => "processes",
            CheckKind::Http => "http",
            CheckKind::Resources => "resources",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ports" => Ok(CheckKind::Ports),
            "processes" => Ok(CheckKind::Processes),
            "http" => Ok(CheckKind::Http),
            "resources" => Ok(CheckKind::Resources),
            other => Err(format!("unknown check category '{}'", other)),
        }
    }
}

impl Serialize for CheckKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One declared thing to probe. Carries everything the checker needs so
/// checkers themselves stay stateless across config reloads.
#[derive(Debug, Clone)]
pub enum CheckTarget {
    Port { host: String, port: u16 },
    Process { name: String, match_type: MatchType },
    Http(HttpTargetConfig),
    Resource(ResourceTargetConfig),
}

impl CheckTarget {
    /// Stable identity used in probe details and report JSON.
    pub fn identity(&self) -> String {
        match self {
            CheckTarget::Port { port, .. } => format!("port {}", port),
            CheckTarget::Process { name, .. } => format!("process '{}'", name),
            CheckTarget::Http(t) => t.url.clone(),
            CheckTarget::Resource(t) => match t.kind {
                ResourceKind::Disk => format!("disk '{}'", t.path),
                kind => kind.as_str().to_string(),
            },
        }
    }
}

/// Common capability of all checkers: inspect current state for one
/// target, report pass/fail with diagnostic detail. Implementations must
/// return within the given timeout or accept being cut off by the engine.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Called once at the start of an evaluation pass, before any of this
    /// checker's targets are dispatched. Lets a checker refresh shared
    /// state a single time per pass instead of per target (the process
    /// checker snapshots the process table here).
    async fn begin_pass(&self) {}

    async fn evaluate(&self, target: &CheckTarget, timeout: Duration) -> ProbeResult;
}

pub type CheckerRegistry = HashMap<CheckKind, Arc<dyn Checker>>;

/// Build the category -> checker mapping once at startup.
pub fn build_registry() -> CheckerRegistry {
    let mut registry: CheckerRegistry = HashMap::new();
    registry.insert(CheckKind::Ports, Arc::new(PortChecker));
    registry.insert(CheckKind::Processes, Arc::new(ProcessChecker::new()));
    registry.insert(CheckKind::Http, Arc::new(HttpChecker::new()));
    registry.insert(CheckKind::Resources, Arc::new(ResourceChecker));
    registry
}
