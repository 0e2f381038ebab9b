// tests/engine_tests.rs
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use healthzd::checks::{CheckKind, CheckTarget, Checker, CheckerRegistry, ProbeResult};
use healthzd::config::{Condition, Config, HttpTargetConfig};
use healthzd::engine::{HealthEngine, ReportScope};

/// Checker that always reports the scripted outcome.
struct ScriptedChecker {
    healthy: bool,
}

#[async_trait]
impl Checker for ScriptedChecker {
    async fn evaluate(&self, target: &CheckTarget, _limit: Duration) -> ProbeResult {
        if self.healthy {
            ProbeResult::pass(target.identity(), "ok")
        } else {
            ProbeResult::fail(target.identity(), "down")
        }
    }
}

/// Checker that never returns on its own; the engine's timeout must cut
/// it off.
struct HungChecker;

#[async_trait]
impl Checker for HungChecker {
    async fn evaluate(&self, target: &CheckTarget, _limit: Duration) -> ProbeResult {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        ProbeResult::pass(target.identity(), "unreachable")
    }
}

fn registry(entries: Vec<(CheckKind, Arc<dyn Checker>)>) -> CheckerRegistry {
    entries.into_iter().collect::<HashMap<_, _>>()
}

/// Config with every category disabled; tests enable what they need.
fn bare_config() -> Config {
    let mut config = Config::default();
    config.checks.ports.enabled = false;
    config.checks.processes.enabled = false;
    config.checks.http.enabled = false;
    config.checks.resources.enabled = false;
    config
}

fn http_target(url: &str) -> HttpTargetConfig {
    HttpTargetConfig {
        url: url.to_string(),
        method: "GET".to_string(),
        timeout_secs: None,
        expected_status: 200,
        body_contains: None,
    }
}

#[tokio::test(start_paused = true)]
async fn hung_probe_is_bounded_by_its_own_timeout() {
    let engine = HealthEngine::with_checkers(registry(vec![(
        CheckKind::Ports,
        Arc::new(HungChecker) as Arc<dyn Checker>,
    )]));
    let mut config = bare_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![8080];
    config.checks.ports.timeout_secs = 5;

    let start = tokio::time::Instant::now();
    let report = engine.evaluate(&config, ReportScope::Full).await;
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(5), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(6), "elapsed {:?}", elapsed);

    let verdict = report.checks.get(&CheckKind::Ports).unwrap();
    assert!(!verdict.healthy);
    assert_eq!(verdict.probes[0].detail, "timeout");
}

#[tokio::test]
async fn open_and_closed_port_under_any_condition() {
    // A bound listener accepts connects via its backlog; a freshly
    // released ephemeral port refuses them.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port();
    let closed_port = {
        let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        probe.local_addr().unwrap().port()
    };

    let engine = HealthEngine::new();
    let mut config = bare_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![open_port, closed_port];
    config.checks.ports.condition = Condition::Any;

    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Ports).unwrap();
    assert!(verdict.healthy);
    assert_eq!(verdict.detail, "1/2 ports healthy");
    assert!(report.is_healthy());

    // Same targets, ALL: one closed port fails the category.
    config.checks.ports.condition = Condition::All;
    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Ports).unwrap();
    assert!(!verdict.healthy);
    assert_eq!(verdict.detail, "1/2 ports healthy");
    assert!(!report.is_healthy());
}

#[tokio::test]
async fn disabled_category_never_appears_in_the_report() {
    let engine = HealthEngine::with_checkers(registry(vec![(
        CheckKind::Ports,
        Arc::new(ScriptedChecker { healthy: true }) as Arc<dyn Checker>,
    )]));
    let mut config = bare_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![80];

    let report = engine.evaluate(&config, ReportScope::Full).await;
    assert!(report.checks.contains_key(&CheckKind::Ports));
    assert!(!report.checks.contains_key(&CheckKind::Http));
    assert!(!report.checks.contains_key(&CheckKind::Processes));
    assert!(!report.checks.contains_key(&CheckKind::Resources));
}

#[tokio::test]
async fn default_config_is_not_vacuously_unhealthy() {
    // Out of the box (no config file) the enabled categories all carry
    // targets; nothing may fail on the "any of zero" rule. Scripted
    // checkers stand in for the real probes so this holds regardless of
    // what is listening on the host.
    let engine = HealthEngine::with_checkers(registry(
        CheckKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind,
                    Arc::new(ScriptedChecker { healthy: true }) as Arc<dyn Checker>,
                )
            })
            .collect(),
    ));
    let config = Config::default();

    let report = engine.evaluate(&config, ReportScope::Full).await;
    assert!(!report.checks.contains_key(&CheckKind::Processes));
    for verdict in report.checks.values() {
        assert!(
            !verdict.detail.contains("no targets configured"),
            "{}: {}",
            verdict.category,
            verdict.detail
        );
    }
    assert!(report.is_healthy());
}

#[tokio::test]
async fn zero_enabled_categories_is_healthy() {
    let engine = HealthEngine::with_checkers(registry(vec![]));
    let report = engine.evaluate(&bare_config(), ReportScope::Full).await;
    assert!(report.is_healthy());
    assert!(report.checks.is_empty());
}

#[tokio::test]
async fn empty_target_set_follows_the_vacuous_rules() {
    let engine = HealthEngine::with_checkers(registry(vec![(
        CheckKind::Ports,
        Arc::new(ScriptedChecker { healthy: true }) as Arc<dyn Checker>,
    )]));
    let mut config = bare_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![];

    config.checks.ports.condition = Condition::All;
    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Ports).unwrap();
    assert!(verdict.healthy);
    assert!(verdict.detail.contains("vacuous pass"));

    config.checks.ports.condition = Condition::Any;
    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Ports).unwrap();
    assert!(!verdict.healthy);
    assert_eq!(verdict.detail, "no targets configured");
}

#[tokio::test]
async fn http_status_mismatch_reports_the_actual_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/status")
        .with_status(503)
        .create_async()
        .await;

    let engine = HealthEngine::new();
    let mut config = bare_config();
    config.checks.http.enabled = true;
    config.checks.http.targets = vec![http_target(&format!("{}/status", server.url()))];

    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Http).unwrap();
    assert!(!verdict.healthy);
    assert!(verdict.probes[0].detail.contains("503"), "{}", verdict.probes[0].detail);
    assert!(!report.is_healthy());
    mock.assert_async().await;
}

#[tokio::test]
async fn http_body_pattern_must_match() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/ready")
        .with_status(200)
        .with_body("database: ready")
        .create_async()
        .await;

    let engine = HealthEngine::new();
    let mut config = bare_config();
    config.checks.http.enabled = true;
    let mut target = http_target(&format!("{}/ready", server.url()));
    target.body_contains = Some("ready".to_string());
    config.checks.http.targets = vec![target.clone()];

    let report = engine.evaluate(&config, ReportScope::Full).await;
    assert!(report.is_healthy());

    target.body_contains = Some("standby".to_string());
    config.checks.http.targets = vec![target];
    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Http).unwrap();
    assert!(!verdict.healthy);
    assert!(verdict.probes[0].detail.contains("standby"));
}

#[tokio::test]
async fn process_check_finds_this_test_and_misses_a_phantom() {
    let engine = HealthEngine::new();
    let mut config = bare_config();
    config.checks.processes.enabled = true;
    config.checks.processes.condition = Condition::Any;
    // The test binary's own path appears in its command line, so a
    // partial match on the file name always hits.
    let own_name = std::env::current_exe()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    config.checks.processes.targets =
        vec![own_name, "no_such_process_zzz".to_string()];

    let report = engine.evaluate(&config, ReportScope::Full).await;
    let verdict = report.checks.get(&CheckKind::Processes).unwrap();
    assert!(verdict.healthy);
    assert_eq!(verdict.detail, "1/2 processes healthy");
}

#[tokio::test]
async fn livez_and_readyz_consult_their_declared_subsets() {
    let engine = HealthEngine::with_checkers(registry(vec![
        (
            CheckKind::Ports,
            Arc::new(ScriptedChecker { healthy: true }) as Arc<dyn Checker>,
        ),
        (
            CheckKind::Http,
            Arc::new(ScriptedChecker { healthy: false }) as Arc<dyn Checker>,
        ),
    ]));
    let mut config = bare_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![80];
    config.checks.http.enabled = true;
    config.checks.http.targets = vec![http_target("http://127.0.0.1:1/status")];
    config.probes.liveness = vec!["ports".to_string()];
    config.probes.readiness = vec!["ports".to_string(), "http".to_string()];

    let live = engine.evaluate(&config, ReportScope::Liveness).await;
    assert!(live.is_healthy());
    assert!(live.checks.contains_key(&CheckKind::Ports));
    assert!(!live.checks.contains_key(&CheckKind::Http));

    let ready = engine.evaluate(&config, ReportScope::Readiness).await;
    assert!(!ready.is_healthy());
    assert!(ready.checks.contains_key(&CheckKind::Http));
}

#[tokio::test]
async fn slow_probes_run_concurrently_not_sequentially() {
    struct SlowChecker;

    #[async_trait]
    impl Checker for SlowChecker {
        async fn evaluate(&self, target: &CheckTarget, _limit: Duration) -> ProbeResult {
            tokio::time::sleep(Duration::from_secs(3)).await;
            ProbeResult::pass(target.identity(), "ok")
        }
    }

    let engine = HealthEngine::with_checkers(registry(vec![(
        CheckKind::Ports,
        Arc::new(SlowChecker) as Arc<dyn Checker>,
    )]));
    let mut config = bare_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![1, 2, 3, 4, 5];
    config.checks.ports.timeout_secs = 10;

    tokio::time::pause();
    let start = tokio::time::Instant::now();
    let report = engine.evaluate(&config, ReportScope::Full).await;
    let elapsed = start.elapsed();

    assert!(report.is_healthy());
    // Five 3-second probes in parallel finish in ~3 virtual seconds.
    assert!(elapsed < Duration::from_secs(4), "elapsed {:?}", elapsed);
}
