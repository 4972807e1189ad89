#![allow(dead_code)]

pub mod fake_provider;

pub use fake_provider::{FakeProvider, VALID_KEY};

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use skycast_gateway::config::{ApiKey, AppConfig, LogFormat, UpstreamConfig};
use skycast_gateway::{build_router, build_state};
use tower::ServiceExt;

pub fn gateway_config(base_url: &str, key: Option<&str>) -> AppConfig {
    AppConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        allowed_origin: None,
        log_format: LogFormat::Pretty,
        upstream: UpstreamConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            api_key: key.and_then(ApiKey::new),
        },
    }
}

pub fn gateway(base_url: &str, key: Option<&str>) -> Router {
    let cfg = gateway_config(base_url, key);
    let state = build_state(&cfg).expect("state should build");
    build_router(state, None).expect("router should build")
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");

    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });

    (status, body)
}

pub async fn post_json(app: &Router, path: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

pub async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
