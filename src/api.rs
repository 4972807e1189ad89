// Copyright 2025 Skycast Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP API handlers for the weather gateway.
//!
//! - `GET /healthz` - Service health check
//! - `GET /metrics` - Prometheus metrics export
//! - `POST /weather/current` - Current conditions by coordinates
//! - `POST /weather/forecast` - Forecast by coordinates
//! - `POST /weather/geocode` - City name to coordinates
//! - `POST /weather/reverse` - Coordinates to place names
//!
//! Weather endpoints always answer 200 with an envelope; failures are carried
//! in the body, never in the status code.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::gateway::{self, Operation, Outcome};
use crate::metrics::Metrics;
use crate::model::{ApiResponse, CurrentApiResponse, ForecastApiResponse, GeocodeApiResponse};
use crate::upstream::WeatherUpstream;

pub const INVALID_JSON: &str = "Request body must be valid JSON";

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn WeatherUpstream>,
    pub metrics: Metrics,
    pub credential_configured: bool,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "skycast-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "credential_configured": state.credential_configured,
    })))
}

/// Metrics endpoint
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state.metrics.export()
}

pub async fn handle_current(State(state): State<AppState>, body: Bytes) -> Json<CurrentApiResponse> {
    dispatch(&state, &gateway::CURRENT, &body).await
}

pub async fn handle_forecast(State(state): State<AppState>, body: Bytes) -> Json<ForecastApiResponse> {
    dispatch(&state, &gateway::FORECAST, &body).await
}

pub async fn handle_geocode(State(state): State<AppState>, body: Bytes) -> Json<GeocodeApiResponse> {
    dispatch(&state, &gateway::GEOCODE, &body).await
}

pub async fn handle_reverse(State(state): State<AppState>, body: Bytes) -> Json<GeocodeApiResponse> {
    dispatch(&state, &gateway::REVERSE, &body).await
}

async fn dispatch(state: &AppState, operation: &Operation, raw: &[u8]) -> Json<ApiResponse> {
    let body = match parse_body(raw) {
        Ok(body) => body,
        Err(error) => {
            tracing::debug!(operation = operation.name, error = %error, "request body is not JSON");
            state
                .metrics
                .record_outcome(operation.name, Outcome::Rejected.as_str());
            return Json(ApiResponse::rejected(INVALID_JSON));
        }
    };

    let completion = operation.execute(state.upstream.as_ref(), body).await;

    if let Some(latency) = completion.upstream_latency {
        state
            .metrics
            .record_upstream(operation.name, latency.as_secs_f64());
    }
    state
        .metrics
        .record_outcome(operation.name, completion.outcome.as_str());

    Json(completion.envelope)
}

/// An empty body counts as absent rather than malformed.
fn parse_body(raw: &[u8]) -> Result<Option<Value>, serde_json::Error> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(raw).map(Some)
}
