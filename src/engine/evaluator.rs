// src/engine/evaluator.rs
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::checks::{build_registry, CheckKind, CheckTarget, CheckerRegistry, ProbeResult};
use crate::config::{ChecksConfig, Condition, Config};
use crate::engine::{aggregate, CategoryVerdict, HealthReport};

/// Which slice of the enabled categories a request consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// Every enabled category (`/health`, `/healthz`).
    Full,
    /// The config-declared `probes.liveness` subset (`/livez`).
    Liveness,
    /// The config-declared `probes.readiness` subset (`/readyz`).
    Readiness,
}

struct CategoryPlan {
    kind: CheckKind,
    condition: Condition,
    probes: Vec<(CheckTarget, Duration)>,
}

/// Orchestrates one evaluation pass: dispatches every in-scope target to
/// its checker concurrently, waits on the join barrier, aggregates each
/// category, and rolls the verdicts up into a report.
///
/// The checker registry is resolved once at startup; configuration is
/// passed per call so an atomically swapped reload takes effect on the
/// next request without touching the engine.
pub struct HealthEngine {
    checkers: CheckerRegistry,
}

impl HealthEngine {
    pub fn new() -> Self {
        Self::with_checkers(build_registry())
    }

    /// Engine with a caller-supplied registry. Tests use this to inject
    /// scripted checkers.
    pub fn with_checkers(checkers: CheckerRegistry) -> Self {
        Self { checkers }
    }

    pub async fn evaluate(&self, config: &Config, scope: ReportScope) -> HealthReport {
        let plans: Vec<CategoryPlan> = scope_kinds(config, scope)
            .into_iter()
            .filter_map(|kind| category_plan(&config.checks, kind))
            .collect();

        // Give each involved checker its once-per-pass hook before any
        // target is dispatched.
        for plan in &plans {
            if let Some(checker) = self.checkers.get(&plan.kind) {
                checker.begin_pass().await;
            }
        }

        // Dispatch everything first so the pass costs max(timeout), not
        // the sum; each probe is bounded by its own timeout and a slow
        // one degrades to a failed result instead of stalling the report.
        let mut pending = Vec::new();
        for plan in plans {
            let Some(checker) = self.checkers.get(&plan.kind) else {
                warn!(category = %plan.kind, "no checker registered, skipping category");
                continue;
            };
            let mut handles = Vec::with_capacity(plan.probes.len());
            for (target, limit) in plan.probes {
                let checker = Arc::clone(checker);
                let identity = target.identity();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(limit, checker.evaluate(&target, limit)).await {
                        Ok(result) => result,
                        Err(_) => ProbeResult::fail(target.identity(), "timeout"),
                    }
                });
                handles.push((identity, handle));
            }
            pending.push((plan.kind, plan.condition, handles));
        }

        let mut checks = BTreeMap::new();
        for (kind, condition, handles) in pending {
            let (identities, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
            let joined = futures::future::join_all(handles).await;
            let results: Vec<ProbeResult> = identities
                .into_iter()
                .zip(joined)
                .map(|(identity, outcome)| match outcome {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(category = %kind, probe = %identity, error = %e, "probe task failed");
                        ProbeResult::fail(identity, format!("probe task failed: {}", e))
                    }
                })
                .collect();

            let verdict = aggregate(kind, condition, results);
            log_verdict(config, &verdict);
            checks.insert(kind, verdict);
        }

        let report = HealthReport::from_verdicts(checks);
        if report.is_healthy() {
            info!(categories = report.checks.len(), "health evaluation complete: healthy");
        } else {
            let failing: Vec<&str> = report
                .checks
                .values()
                .filter(|v| !v.healthy)
                .map(|v| v.category.as_str())
                .collect();
            warn!(?failing, "health evaluation complete: unhealthy");
        }
        report
    }
}

impl Default for HealthEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn log_verdict(config: &Config, verdict: &CategoryVerdict) {
    if verdict.healthy {
        if config.logging.log_success_checks {
            info!(category = %verdict.category, detail = %verdict.detail, "category healthy");
        } else {
            debug!(category = %verdict.category, detail = %verdict.detail, "category healthy");
        }
    } else {
        warn!(category = %verdict.category, detail = %verdict.detail, "category unhealthy");
    }
}

fn scope_kinds(config: &Config, scope: ReportScope) -> Vec<CheckKind> {
    let names = match scope {
        ReportScope::Full => return CheckKind::ALL.to_vec(),
        ReportScope::Liveness => &config.probes.liveness,
        ReportScope::Readiness => &config.probes.readiness,
    };
    // Unknown names are rejected at startup; this filter is only reached
    // with a validated config.
    names.iter().filter_map(|name| name.parse().ok()).collect()
}

/// Expand one category's config into dispatchable (target, timeout)
/// pairs. Disabled categories yield no plan and are therefore absent
/// from the report entirely.
fn category_plan(checks: &ChecksConfig, kind: CheckKind) -> Option<CategoryPlan> {
    match kind {
        CheckKind::Ports => {
            let c = &checks.ports;
            c.enabled.then(|| CategoryPlan {
                kind,
                condition: c.condition,
                probes: c
                    .targets
                    .iter()
                    .map(|&port| {
                        (
                            CheckTarget::Port {
                                host: c.host.clone(),
                                port,
                            },
                            c.timeout(),
                        )
                    })
                    .collect(),
            })
        }
        CheckKind::Processes => {
            let c = &checks.processes;
            c.enabled.then(|| CategoryPlan {
                kind,
                condition: c.condition,
                probes: c
                    .targets
                    .iter()
                    .map(|name| {
                        (
                            CheckTarget::Process {
                                name: name.clone(),
                                match_type: c.match_type,
                            },
                            c.timeout(),
                        )
                    })
                    .collect(),
            })
        }
        CheckKind::Http => {
            let c = &checks.http;
            c.enabled.then(|| CategoryPlan {
                kind,
                condition: c.condition,
                probes: c
                    .targets
                    .iter()
                    .map(|t| {
                        let limit =
                            Duration::from_secs(t.timeout_secs.unwrap_or(c.timeout_secs));
                        (CheckTarget::Http(t.clone()), limit)
                    })
                    .collect(),
            })
        }
        CheckKind::Resources => {
            let c = &checks.resources;
            c.enabled.then(|| CategoryPlan {
                kind,
                condition: c.condition,
                probes: c
                    .targets
                    .iter()
                    .map(|t| (CheckTarget::Resource(t.clone()), c.timeout()))
                    .collect(),
            })
        }
    }
}
