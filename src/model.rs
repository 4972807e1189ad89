// Copyright 2025 Skycast Labs
// SPDX-License-Identifier: Apache-2.0

//! Data models for the gateway.
//!
//! Upstream descriptors exchanged with the provider client, and the envelope
//! returned to front-end callers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;

/// Query parameter the upstream client reserves for the credential.
pub const CREDENTIAL_PARAM: &str = "appid";

/// A provider-relative call. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub path: &'static str,
    pub params: BTreeMap<String, String>,
}

impl UpstreamRequest {
    pub fn new(path: &'static str) -> Self {
        Self {
            path,
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// What the provider answered.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    /// HTTP-level success; says nothing about errors encoded in `body`.
    pub ok: bool,
    pub status: u16,
    /// Canonical reason phrase; empty for non-standard codes.
    pub status_text: String,
    pub body: Value,
    /// Resolved request URL without the credential parameter.
    pub url: String,
}

/// Normalized response shape shared by every operation.
///
/// Fields are private: the constructors below are the only way to build one,
/// so `success` always agrees with the fields that accompany it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

pub type CurrentApiResponse = ApiResponse;
pub type ForecastApiResponse = ApiResponse;
pub type GeocodeApiResponse = ApiResponse;

impl ApiResponse {
    /// Provider payload passed through unmodified.
    pub fn ok(body: Value) -> Self {
        Self {
            success: true,
            response: Some(body),
            error_message: None,
            error: None,
        }
    }

    /// Request refused before reaching the provider.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error_message: Some(message.into()),
            error: None,
        }
    }

    /// Provider answered with a non-success status.
    pub fn upstream_error(status: u16, status_text: &str) -> Self {
        let status_line = match status_text.trim() {
            "" => status.to_string(),
            text => format!("{status} {text}"),
        };

        Self {
            success: false,
            response: Some(Value::String(status_line)),
            error_message: Some("Invalid response".to_string()),
            error: None,
        }
    }

    /// Configuration or transport fault caught at the operation boundary.
    pub fn faulted(error: &GatewayError) -> Self {
        let error = serde_json::to_value(error)
            .unwrap_or_else(|_| Value::String(error.to_string()));

        Self {
            success: false,
            response: None,
            error_message: None,
            error: Some(error),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn error(&self) -> Option<&Value> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejected_serializes_only_error_message() {
        let value = serde_json::to_value(ApiResponse::rejected("City is required")).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "errorMessage": "City is required" })
        );
    }

    #[test]
    fn upstream_error_keeps_status_line() {
        let envelope = ApiResponse::upstream_error(401, "Unauthorized");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({
                "success": false,
                "response": "401 Unauthorized",
                "errorMessage": "Invalid response",
            })
        );
    }

    #[test]
    fn unknown_status_has_no_trailing_space() {
        let envelope = ApiResponse::upstream_error(599, "");
        assert_eq!(
            envelope.response(),
            Some(&Value::String("599".to_string()))
        );
        assert_eq!(envelope.error_message(), Some("Invalid response"));
    }

    #[test]
    fn ok_passes_body_through() {
        let body = json!([{ "name": "Paris", "lat": 48.85, "lon": 2.35 }]);
        let envelope = ApiResponse::ok(body.clone());

        assert!(envelope.success());
        assert_eq!(envelope.response(), Some(&body));
        assert!(envelope.error_message().is_none());
        assert!(envelope.error().is_none());
    }

    #[test]
    fn faulted_carries_structured_error() {
        let envelope = ApiResponse::faulted(&GatewayError::Transport("dns failure".into()));
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({
                "success": false,
                "error": { "kind": "transport", "message": "dns failure" },
            })
        );
    }

    #[test]
    fn request_builder_collects_params() {
        let request = UpstreamRequest::new("/geo/1.0/direct")
            .param("q", "Paris,FR")
            .param("limit", "5");

        assert_eq!(request.path, "/geo/1.0/direct");
        assert_eq!(request.params.get("q").map(String::as_str), Some("Paris,FR"));
        assert_eq!(request.params.len(), 2);
    }
}
