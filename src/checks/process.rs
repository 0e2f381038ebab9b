// src/checks/process.rs
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};
use tracing::{debug, warn};

use crate::checks::{CheckTarget, Checker, ProbeResult};
use crate::config::MatchType;

/// Checks that a named process is running. The process table is refreshed
/// once per evaluation pass in `begin_pass`, not per target, so a category
/// with many targets scans `/proc` a single time. The scan itself is a
/// blocking syscall walk and runs on the blocking pool, off the executor.
pub struct ProcessChecker {
    sys: Arc<Mutex<System>>,
}

impl ProcessChecker {
    pub fn new() -> Self {
        Self {
            sys: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for ProcessChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_table(sys: &Mutex<System>) -> std::sync::MutexGuard<'_, System> {
    sys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Checker for ProcessChecker {
    async fn begin_pass(&self) {
        let sys = Arc::clone(&self.sys);
        let refreshed = tokio::task::spawn_blocking(move || {
            lock_table(&sys).refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::new().with_cmd(UpdateKind::Always),
            )
        })
        .await;
        match refreshed {
            Ok(count) => debug!(processes = count, "process table refreshed"),
            Err(e) => warn!(error = %e, "process table refresh did not complete"),
        }
    }

    async fn evaluate(&self, target: &CheckTarget, _limit: Duration) -> ProbeResult {
        let CheckTarget::Process { name, match_type } = target else {
            return ProbeResult::fail(target.identity(), "not a process target");
        };

        // Lookup against the snapshot taken in begin_pass; held briefly,
        // never across an await.
        let count = {
            let sys = lock_table(&self.sys);
            sys.processes()
                .values()
                .filter(|process| matches(process, name, *match_type))
                .count()
        };

        if count > 0 {
            ProbeResult::pass(
                target.identity(),
                format!("{} matching process(es) running", count),
            )
            .with_observation(count as f64)
        } else {
            ProbeResult::fail(target.identity(), "not running").with_observation(0.0)
        }
    }
}

fn matches(process: &sysinfo::Process, name: &str, match_type: MatchType) -> bool {
    let process_name = process.name().to_string_lossy();
    match match_type {
        MatchType::Exact => process_name == name,
        MatchType::Partial => {
            process_name.contains(name)
                || process
                    .cmd()
                    .iter()
                    .any(|arg| arg.to_string_lossy().contains(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_then_lookup_misses_a_phantom_process() {
        let checker = ProcessChecker::new();
        checker.begin_pass().await;
        let target = CheckTarget::Process {
            name: "no_such_process_zzz".to_string(),
            match_type: MatchType::Partial,
        };
        let result = checker.evaluate(&target, Duration::from_secs(2)).await;
        assert!(!result.healthy);
        assert_eq!(result.detail, "not running");
    }
}
