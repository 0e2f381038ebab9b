// src/server/handler.rs
use arc_swap::ArcSwap;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::sync::Arc;
use tower::Service;

use crate::config::Config;
use crate::engine::{HealthEngine, ReportScope};

/// State shared by every request: the engine (checker registry, resolved
/// once) and the current configuration behind an atomic swap so a reload
/// is observed wholesale, never half-applied.
pub struct AppState {
    pub engine: HealthEngine,
    pub config: ArcSwap<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            engine: HealthEngine::new(),
            config: ArcSwap::from_pointee(config),
        }
    }
}

#[derive(Clone)]
pub struct RequestHandler {
    state: Arc<AppState>,
}

impl RequestHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

/// Endpoint paths are contract surface for orchestrators; all four map
/// onto the same engine and differ only in scope.
fn route(path: &str) -> Option<ReportScope> {
    match path {
        "/health" | "/healthz" => Some(ReportScope::Full),
        "/livez" => Some(ReportScope::Liveness),
        "/readyz" => Some(ReportScope::Readiness),
        _ => None,
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Box<dyn std::error::Error + Send + Sync>;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move {
            let Some(scope) = route(req.uri().path()) else {
                return Ok(plain_response(StatusCode::NOT_FOUND, "Not Found"));
            };
            if req.method() != Method::GET {
                return Ok(plain_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Method Not Allowed",
                ));
            }

            // Fresh evaluation per request against the config snapshot
            // current at this instant; concurrent reloads swap the whole
            // Arc and never expose a partial view.
            let config = state.config.load_full();
            let report = state.engine.evaluate(&config, scope).await;

            let status = if report.is_healthy() {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            let body = match serde_json::to_vec(&report) {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize health report");
                    return Ok(plain_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                    ));
                }
            };
            Ok(Response::builder()
                .status(status)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap())
        })
    }
}

fn plain_response(status: StatusCode, message: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(message))
        .unwrap()
}
