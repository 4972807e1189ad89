// Copyright 2025 Skycast Labs
// SPDX-License-Identifier: Apache-2.0

//! Skycast weather gateway.
//!
//! Accepts simplified weather and geocoding requests, forwards them to
//! OpenWeatherMap with the server-side API key injected, and normalizes every
//! answer into an [`model::ApiResponse`] envelope.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod model;
pub mod upstream;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::upstream::OpenWeatherClient;

/// Wire up the production state from configuration.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let client = OpenWeatherClient::try_new(cfg.upstream.clone())?;
    let credential_configured = client.has_credential();
    let metrics = Metrics::new()?;

    Ok(AppState {
        upstream: Arc::new(client),
        metrics,
        credential_configured,
    })
}

pub fn build_router(state: AppState, allowed_origin: Option<&str>) -> anyhow::Result<Router> {
    let mut app = Router::new()
        .route("/healthz", get(api::health))
        .route("/metrics", get(api::metrics))
        .route("/weather/current", post(api::handle_current))
        .route("/weather/forecast", post(api::handle_forecast))
        .route("/weather/geocode", post(api::handle_geocode))
        .route("/weather/reverse", post(api::handle_reverse))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = allowed_origin {
        let origin: HeaderValue = origin
            .parse()
            .with_context(|| format!("invalid GATEWAY_ALLOWED_ORIGIN `{origin}`"))?;

        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    Ok(app)
}
