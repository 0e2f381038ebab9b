// tests/server_tests.rs
use std::sync::Arc;

use healthzd::config::{Condition, Config};
use healthzd::server::{AppState, RequestHandler};
use hyper::{Body, Method, Request, Response, StatusCode};
use tower::Service;

/// Config with every category disabled: evaluation touches nothing on
/// the host and the overall verdict is healthy by definition.
fn disabled_config() -> Config {
    let mut config = Config::default();
    config.checks.ports.enabled = false;
    config.checks.processes.enabled = false;
    config.checks.http.enabled = false;
    config.checks.resources.enabled = false;
    config
}

fn handler_for(config: Config) -> RequestHandler {
    RequestHandler::new(Arc::new(AppState::new(config)))
}

async fn call(handler: &mut RequestHandler, method: Method, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    handler.call(request).await.unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let mut handler = handler_for(disabled_config());
    let response = call(&mut handler, Method::GET, "/metrics").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_get_method_is_rejected() {
    let mut handler = handler_for(disabled_config());
    let response = call(&mut handler, Method::POST, "/health").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn healthy_report_serializes_to_a_200_json_body() {
    let mut handler = handler_for(disabled_config());
    for path in ["/health", "/healthz", "/livez", "/readyz"] {
        let response = call(&mut handler, Method::GET, path).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
        assert_eq!(
            response.headers()["content-type"],
            "application/json",
            "{}",
            path
        );
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["checks"], serde_json::json!({}));
    }
}

#[tokio::test]
async fn unhealthy_report_maps_to_503_with_full_diagnostics() {
    // An enabled ANY category with no targets can never pass; the body
    // still carries the reason while the status code stays the coarse
    // signal.
    let mut config = disabled_config();
    config.checks.ports.enabled = true;
    config.checks.ports.targets = vec![];
    config.checks.ports.condition = Condition::Any;

    let mut handler = handler_for(config);
    let response = call(&mut handler, Method::GET, "/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["ports"]["status"], "unhealthy");
    assert_eq!(
        body["checks"]["ports"]["details"]["message"],
        "no targets configured"
    );
}
