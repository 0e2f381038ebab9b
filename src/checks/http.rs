// src/checks/http.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use tokio::time::Instant;
use tracing::debug;

use crate::checks::{CheckTarget, Checker, ProbeResult};

/// Issues the configured method against an HTTP endpoint and verifies the
/// response status (and optionally a body substring). Any network failure
/// degrades to a failed probe with the underlying reason in the detail,
/// never to an error that escapes the checker.
pub struct HttpChecker {
    client: Client,
}

impl HttpChecker {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Checker for HttpChecker {
    async fn evaluate(&self, target: &CheckTarget, limit: Duration) -> ProbeResult {
        let CheckTarget::Http(t) = target else {
            return ProbeResult::fail(target.identity(), "not an http target");
        };

        // Validated at config resolution; a failure here means the target
        // was constructed outside the resolver.
        let method = match Method::from_bytes(t.method.as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                return ProbeResult::fail(
                    target.identity(),
                    format!("invalid HTTP method '{}'", t.method),
                )
            }
        };

        let start = Instant::now();
        let response = self
            .client
            .request(method, &t.url)
            .timeout(limit)
            .send()
            .await;
        let elapsed_ms = start.elapsed().as_millis() as f64;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                if status != t.expected_status {
                    return ProbeResult::fail(
                        target.identity(),
                        format!("expected status {}, got {}", t.expected_status, status),
                    )
                    .with_observation(elapsed_ms);
                }
                if let Some(pattern) = &t.body_contains {
                    match response.text().await {
                        Ok(body) if body.contains(pattern) => {}
                        Ok(_) => {
                            return ProbeResult::fail(
                                target.identity(),
                                format!("body does not contain '{}'", pattern),
                            )
                            .with_observation(elapsed_ms);
                        }
                        Err(e) => {
                            return ProbeResult::fail(
                                target.identity(),
                                format!("failed to read body: {}", e),
                            );
                        }
                    }
                }
                debug!(url = %t.url, status, elapsed_ms, "http target healthy");
                ProbeResult::pass(
                    target.identity(),
                    format!("status {} in {:.0} ms", status, elapsed_ms),
                )
                .with_observation(elapsed_ms)
            }
            Err(e) if e.is_timeout() => ProbeResult::fail(target.identity(), "timeout"),
            Err(e) => ProbeResult::fail(target.identity(), format!("request failed: {}", e)),
        }
    }
}
