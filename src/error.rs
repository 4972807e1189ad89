// Copyright 2025 Skycast Labs
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Faults raised while talking to the weather provider.
///
/// These never escape a gateway operation: they are folded into the `error`
/// field of the envelope, serialized as `{"kind": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum GatewayError {
    /// The provider credential is not configured.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Network, DNS, TLS or timeout failure.
    #[error("upstream request failed: {0}")]
    Transport(String),
    /// The provider answered with a body that is not JSON.
    #[error("failed to parse upstream response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn missing_credential() -> Self {
        Self::Configuration("Missing OpenWeatherMap API key".to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        // The request URL carries the credential; keep it out of the message.
        let error = error.without_url();
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Errors of the operational endpoints (`/healthz`, `/metrics`).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Internal(ref error) => {
                tracing::error!(error = %error, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
