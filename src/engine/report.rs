// src/engine/report.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::checks::{CheckKind, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
}

/// Verdict for one category: the aggregated pass/fail plus the probe
/// results that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryVerdict {
    pub category: CheckKind,
    pub healthy: bool,
    pub detail: String,
    pub probes: Vec<ProbeResult>,
}

// Wire shape: {"status": "healthy", "details": {"message": ..., "probes": [...]}}.
// The category name itself is the key in the report's `checks` map.
impl Serialize for CategoryVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Details<'a> {
            message: &'a str,
            probes: &'a [ProbeResult],
        }

        let mut state = serializer.serialize_struct("CategoryVerdict", 2)?;
        state.serialize_field("status", if self.healthy { "healthy" } else { "unhealthy" })?;
        state.serialize_field(
            "details",
            &Details {
                message: &self.detail,
                probes: &self.probes,
            },
        )?;
        state.end()
    }
}

/// One complete evaluation: per-category verdicts plus the overall rollup.
///
/// `checks` holds only the categories that were enabled and in scope;
/// disabled categories are absent entirely, not marked healthy. The
/// top-level field names are contract surface for orchestrators.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<CheckKind, CategoryVerdict>,
}

impl HealthReport {
    /// Overall status is the conjunction of the included verdicts. With
    /// zero enabled categories there is nothing to fail, so the report is
    /// healthy; deployments that disable everything get a permanent 200.
    pub fn from_verdicts(checks: BTreeMap<CheckKind, CategoryVerdict>) -> Self {
        let healthy = checks.values().all(|v| v.healthy);
        Self {
            status: if healthy {
                OverallStatus::Healthy
            } else {
                OverallStatus::Unhealthy
            },
            timestamp: Utc::now(),
            checks,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }
}
