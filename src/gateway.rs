// Copyright 2025 Skycast Labs
// SPDX-License-Identifier: Apache-2.0

//! Gateway operations.
//!
//! Every operation runs the same pipeline: validate the request body, map it
//! to provider query parameters, forward it, and fold the result into an
//! [`ApiResponse`]. What differs per operation is data, captured in
//! [`Operation`]:
//!
//! | operation  | provider path        | required     | derived params                     |
//! |------------|----------------------|--------------|------------------------------------|
//! | `current`  | `/data/2.5/weather`  | `lat`, `lon` | `lat`, `lon`                       |
//! | `forecast` | `/data/2.5/forecast` | `lat`, `lon` | `lat`, `lon`                       |
//! | `geocode`  | `/geo/1.0/direct`    | `city`       | `q=city[,state][,country]`, `limit`|
//! | `reverse`  | `/geo/1.0/reverse`   | `lat`, `lon` | `lat`, `lon`, `limit`              |

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::Instant;

use crate::error::GatewayError;
use crate::model::{ApiResponse, UpstreamRequest};
use crate::upstream::WeatherUpstream;

pub const BODY_REQUIRED: &str = "Request body is required";
pub const GEOCODE_LIMIT: &str = "5";

type Fields = Map<String, Value>;
type Params = BTreeMap<String, String>;

/// Turns validated request fields into provider query parameters.
pub type ParamMapper = fn(&Fields) -> Result<Params, String>;

/// Terminal state of one gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    Succeeded,
    UpstreamError,
    Faulted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::Succeeded => "succeeded",
            Outcome::UpstreamError => "upstream_error",
            Outcome::Faulted => "faulted",
        }
    }
}

/// Result of [`Operation::execute`]: the envelope plus what it took to get it.
#[derive(Debug, Clone)]
pub struct Completion {
    pub outcome: Outcome,
    pub envelope: ApiResponse,
    /// Set only when the call was forwarded.
    pub upstream_latency: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub path: &'static str,
    /// Fields that must be present and non-null. `0` counts as present.
    pub required: &'static [&'static str],
    pub missing_message: &'static str,
    pub map_params: ParamMapper,
}

pub const CURRENT: Operation = Operation {
    name: "current",
    path: "/data/2.5/weather",
    required: &["lat", "lon"],
    missing_message: "Missing lat/lon",
    map_params: coordinates,
};

pub const FORECAST: Operation = Operation {
    name: "forecast",
    path: "/data/2.5/forecast",
    required: &["lat", "lon"],
    missing_message: "Missing lat/lon",
    map_params: coordinates,
};

pub const GEOCODE: Operation = Operation {
    name: "geocode",
    path: "/geo/1.0/direct",
    required: &["city"],
    missing_message: "City is required",
    map_params: direct_query,
};

pub const REVERSE: Operation = Operation {
    name: "reverse",
    path: "/geo/1.0/reverse",
    required: &["lat", "lon"],
    missing_message: "Lat/lon is required",
    map_params: coordinates_with_limit,
};

impl Operation {
    pub async fn handle(&self, upstream: &dyn WeatherUpstream, body: Option<Value>) -> ApiResponse {
        self.execute(upstream, body).await.envelope
    }

    pub async fn execute(&self, upstream: &dyn WeatherUpstream, body: Option<Value>) -> Completion {
        let request = match self.validate(body) {
            Ok(request) => request,
            Err(reason) => {
                tracing::debug!(operation = self.name, reason = %reason, "request rejected");
                return Completion {
                    outcome: Outcome::Rejected,
                    envelope: ApiResponse::rejected(reason),
                    upstream_latency: None,
                };
            }
        };

        let start = Instant::now();
        let result = upstream.fetch(&request).await;
        let elapsed = start.elapsed();

        // A configuration fault is raised before any network activity.
        let forwarded = !matches!(result, Err(GatewayError::Configuration(_)));

        let (outcome, envelope) = match result {
            Ok(result) if result.ok => {
                tracing::info!(
                    operation = self.name,
                    status = result.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "upstream call succeeded"
                );
                (Outcome::Succeeded, ApiResponse::ok(result.body))
            }
            Ok(result) => {
                tracing::warn!(
                    operation = self.name,
                    status = result.status,
                    url = %result.url,
                    "upstream returned error status"
                );
                (
                    Outcome::UpstreamError,
                    ApiResponse::upstream_error(result.status, &result.status_text),
                )
            }
            Err(error) => {
                tracing::error!(
                    operation = self.name,
                    kind = error.kind(),
                    error = %error,
                    "upstream call faulted"
                );
                (Outcome::Faulted, ApiResponse::faulted(&error))
            }
        };

        Completion {
            outcome,
            envelope,
            upstream_latency: forwarded.then_some(elapsed),
        }
    }

    /// First failure wins: body, then presence, then field shapes.
    fn validate(&self, body: Option<Value>) -> Result<UpstreamRequest, String> {
        let fields = match body {
            None | Some(Value::Null) => return Err(BODY_REQUIRED.to_string()),
            Some(Value::Object(fields)) => fields,
            // Present but shapeless: every field lookup misses.
            Some(_) => Fields::new(),
        };

        let missing = self
            .required
            .iter()
            .any(|key| fields.get(*key).map_or(true, Value::is_null));
        if missing {
            return Err(self.missing_message.to_string());
        }

        let params = (self.map_params)(&fields)?;

        Ok(UpstreamRequest {
            path: self.path,
            params,
        })
    }
}

fn coordinates(fields: &Fields) -> Result<Params, String> {
    let mut params = Params::new();
    params.insert("lat".into(), coordinate(fields, "lat", 90.0)?);
    params.insert("lon".into(), coordinate(fields, "lon", 180.0)?);
    Ok(params)
}

fn coordinates_with_limit(fields: &Fields) -> Result<Params, String> {
    let mut params = coordinates(fields)?;
    params.insert("limit".into(), GEOCODE_LIMIT.into());
    Ok(params)
}

fn direct_query(fields: &Fields) -> Result<Params, String> {
    let city = match fields.get("city") {
        Some(Value::String(city)) if !city.trim().is_empty() => city.trim(),
        Some(Value::String(_)) => return Err(GEOCODE.missing_message.to_string()),
        _ => return Err("city must be a string".to_string()),
    };

    let mut q = city.to_string();
    for key in ["state", "country"] {
        if let Some(part) = optional_text(fields, key)? {
            q.push(',');
            q.push_str(part);
        }
    }

    let mut params = Params::new();
    params.insert("q".into(), q);
    params.insert("limit".into(), GEOCODE_LIMIT.into());
    Ok(params)
}

/// Stringifies a coordinate the way it arrived, after a range check.
fn coordinate(fields: &Fields, key: &str, bound: f64) -> Result<String, String> {
    let (value, text) = match fields.get(key) {
        Some(Value::Number(n)) => (n.as_f64(), n.to_string()),
        Some(Value::String(s)) => (s.trim().parse::<f64>().ok(), s.trim().to_string()),
        _ => (None, String::new()),
    };

    match value {
        Some(v) if !v.is_finite() => Err(format!("{key} must be a number")),
        Some(v) if v.abs() > bound => Err(format!("{key} must be between -{bound} and {bound}")),
        Some(_) => Ok(text),
        None => Err(format!("{key} must be a number")),
    }
}

fn optional_text<'a>(fields: &'a Fields, key: &str) -> Result<Option<&'a str>, String> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim())),
        Some(_) => Err(format!("{key} must be a string")),
    }
}
