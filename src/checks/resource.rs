// src/checks/resource.rs
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sysinfo::{Disks, System};
use tracing::debug;

use crate::checks::{CheckTarget, Checker, ProbeResult};
use crate::config::{ResourceKind, ResourceTargetConfig};

/// Measures cpu, memory, or disk usage and compares it to a configured
/// threshold. A measurement exactly at the threshold counts as healthy;
/// only exceeding it fails.
pub struct ResourceChecker;

#[async_trait]
impl Checker for ResourceChecker {
    async fn evaluate(&self, target: &CheckTarget, _limit: Duration) -> ProbeResult {
        let CheckTarget::Resource(t) = target else {
            return ProbeResult::fail(target.identity(), "not a resource target");
        };

        let measured = match t.kind {
            ResourceKind::Cpu => measure_cpu().await,
            ResourceKind::Memory => measure_memory(),
            ResourceKind::Disk => measure_disk(&t.path),
        };

        match measured {
            Ok(usage) => verdict(target.identity(), t, usage),
            Err(reason) => ProbeResult::fail(target.identity(), reason),
        }
    }
}

fn verdict(identity: String, t: &ResourceTargetConfig, usage: f64) -> ProbeResult {
    let detail = format!(
        "{:.1}% used (threshold {}%)",
        usage, t.threshold_percent
    );
    debug!(resource = %identity, usage, threshold = t.threshold_percent, "resource measured");
    if usage <= t.threshold_percent {
        ProbeResult::pass(identity, detail).with_observation(usage)
    } else {
        ProbeResult::fail(identity, detail).with_observation(usage)
    }
}

/// Cpu usage needs two samples with a minimum gap between them; the sleep
/// is async so it never blocks sibling probes.
async fn measure_cpu() -> Result<f64, String> {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    sys.refresh_cpu_usage();
    Ok(sys.global_cpu_usage() as f64)
}

fn measure_memory() -> Result<f64, String> {
    let mut sys = System::new();
    sys.refresh_memory();
    let total = sys.total_memory();
    if total == 0 {
        return Err("unable to read memory statistics".to_string());
    }
    Ok(sys.used_memory() as f64 / total as f64 * 100.0)
}

/// Usage of the filesystem mounted closest to `path` (longest matching
/// mount point wins, so "/var/lib" prefers a dedicated /var mount over /).
fn measure_disk(path: &str) -> Result<f64, String> {
    let target = Path::new(path);
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .iter()
        .filter(|d| target.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len())
        .ok_or_else(|| format!("no mount point found for '{}'", path))?;

    let total = disk.total_space();
    if total == 0 {
        return Err(format!("mount '{}' reports zero capacity", path));
    }
    let used = total - disk.available_space();
    Ok(used as f64 / total as f64 * 100.0)
}
