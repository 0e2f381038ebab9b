// src/checks/port.rs
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};
use tracing::debug;

use crate::checks::{CheckTarget, Checker, ProbeResult};

/// Probes a TCP port with a bounded-timeout connect. A port is healthy
/// iff something accepts the connection before the timeout elapses.
pub struct PortChecker;

#[async_trait]
impl Checker for PortChecker {
    async fn evaluate(&self, target: &CheckTarget, limit: Duration) -> ProbeResult {
        let CheckTarget::Port { host, port } = target else {
            return ProbeResult::fail(target.identity(), "not a port target");
        };
        let addr = format!("{}:{}", host, port);
        let start = Instant::now();

        match timeout(limit, TcpStream::connect(&addr)).await {
            Ok(Ok(_stream)) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                debug!(%addr, elapsed_ms, "port listening");
                ProbeResult::pass(target.identity(), format!("listening on {}", addr))
                    .with_observation(elapsed_ms)
            }
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "port connect failed");
                ProbeResult::fail(target.identity(), format!("connect failed: {}", e))
            }
            Err(_) => ProbeResult::fail(target.identity(), "timeout"),
        }
    }
}
