// src/main.rs
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter};

use healthzd::config;
use healthzd::server::{AppState, RequestHandler, ServerBuilder};

#[tokio::main]
async fn main() -> Result<()> {
    // Start with a provisional filter; once the config is resolved the
    // console level from it takes over (unless RUST_LOG is set, which
    // always wins).
    let (filter, filter_handle) = reload::Layer::new(build_filter("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HEALTHZD_CONFIG_PATH").ok())
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("resolving configuration from: {}", config_path);
    let cfg = config::load_config(&config_path)
        .await
        .context("configuration resolution failed")?;

    if std::env::var("RUST_LOG").is_err() {
        let _ = filter_handle.reload(build_filter(&cfg.logging.console.level));
    }

    info!(
        name = %cfg.application.name,
        version = %cfg.application.version,
        environment = %cfg.application.environment,
        "starting health check daemon"
    );
    info!(enabled = ?enabled_categories(&cfg), "check categories");

    let addr = SocketAddr::new(
        cfg.server.host.parse().context("invalid server.host")?,
        cfg.server.port,
    );

    let state = Arc::new(AppState::new(cfg));

    #[cfg(unix)]
    spawn_reload_listener(state.clone(), config_path);

    ServerBuilder::new(addr)
        .with_handler(RequestHandler::new(state))
        .serve(shutdown_signal())
        .await?;

    Ok(())
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("healthzd={},hyper=info,reqwest=info", level)))
}

fn enabled_categories(cfg: &config::Config) -> Vec<&'static str> {
    let mut enabled = Vec::new();
    if cfg.checks.ports.enabled {
        enabled.push("ports");
    }
    if cfg.checks.processes.enabled {
        enabled.push("processes");
    }
    if cfg.checks.http.enabled {
        enabled.push("http");
    }
    if cfg.checks.resources.enabled {
        enabled.push("resources");
    }
    enabled
}

/// Re-resolve and atomically swap the configuration on SIGHUP. In-flight
/// requests keep the snapshot they loaded; a failed reload keeps the
/// previous configuration running.
#[cfg(unix)]
fn spawn_reload_listener(state: Arc<AppState>, config_path: String) {
    tokio::spawn(async move {
        let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "failed to install SIGHUP handler, reload disabled");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            match config::load_config(&config_path).await {
                Ok(cfg) => {
                    state.config.store(Arc::new(cfg));
                    info!("configuration reloaded");
                }
                Err(e) => {
                    warn!(error = %e, "reload failed, keeping previous configuration");
                }
            }
        }
    });
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
