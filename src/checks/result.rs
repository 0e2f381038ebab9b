// src/checks/result.rs
use serde::{Serialize, Serializer};

/// Outcome of one probe: one target, one evaluation, produced fresh on
/// every pass and never cached across requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub target: String,
    #[serde(rename = "status", serialize_with = "ser_status")]
    pub healthy: bool,
    pub detail: String,
    /// Numeric observation backing the verdict, when one exists
    /// (measured cpu %, match count, response latency in ms).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<f64>,
}

impl ProbeResult {
    pub fn pass(target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            healthy: true,
            detail: detail.into(),
            observed: None,
        }
    }

    pub fn fail(target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            healthy: false,
            detail: detail.into(),
            observed: None,
        }
    }

    pub fn with_observation(mut self, value: f64) -> Self {
        self.observed = Some(value);
        self
    }
}

pub(crate) fn ser_status<S: Serializer>(healthy: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *healthy { "healthy" } else { "unhealthy" })
}
