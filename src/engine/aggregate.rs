// src/engine/aggregate.rs
use crate::checks::{CheckKind, ProbeResult};
use crate::config::Condition;
use crate::engine::CategoryVerdict;

/// Reduce one category's probe results to a verdict under its configured
/// condition. Pure function, no side effects.
///
/// Empty input is the one subtle case: "all of zero" passes vacuously
/// (and says so in the detail, to avoid silent misinterpretation), while
/// "any of zero" cannot be satisfied and fails.
pub fn aggregate(
    category: CheckKind,
    condition: Condition,
    results: Vec<ProbeResult>,
) -> CategoryVerdict {
    let total = results.len();
    let healthy_count = results.iter().filter(|r| r.healthy).count();

    let (healthy, detail) = if total == 0 {
        match condition {
            Condition::All => (true, "no targets configured (vacuous pass)".to_string()),
            Condition::Any => (false, "no targets configured".to_string()),
        }
    } else {
        let healthy = match condition {
            Condition::All => healthy_count == total,
            Condition::Any => healthy_count > 0,
        };
        (
            healthy,
            format!("{}/{} {} healthy", healthy_count, total, category),
        )
    };

    CategoryVerdict {
        category,
        healthy,
        detail,
        probes: results,
    }
}
