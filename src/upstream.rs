// Copyright 2025 Skycast Labs
// SPDX-License-Identifier: Apache-2.0

//! Upstream client for the weather provider.
//!
//! Resolves a provider-relative request against the configured base URL,
//! injects the credential and hands back a uniform result descriptor.

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::config::{ApiKey, UpstreamConfig};
use crate::error::GatewayError;
use crate::model::{UpstreamRequest, UpstreamResult, CREDENTIAL_PARAM};

/// Anything able to answer an [`UpstreamRequest`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherUpstream: Send + Sync {
    /// Issue one GET against the provider.
    ///
    /// Returns `Err` only for configuration and transport faults. A provider
    /// error status is an `Ok` result with `ok == false`.
    async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResult, GatewayError>;
}

/// HTTP client wrapper for talking to OpenWeatherMap.
#[derive(Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    api_key: Option<ApiKey>,
    client: Client,
}

impl OpenWeatherClient {
    /// Construct a new upstream client using the provided configuration.
    pub fn try_new(config: UpstreamConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                GatewayError::Transport(format!("failed to build upstream client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url,
            api_key: config.api_key,
            client,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Endpoint URL with the request's own params; no credential.
    fn resolve(&self, request: &UpstreamRequest) -> Result<Url, GatewayError> {
        let endpoint = format!("{}{}", self.base_url.trim_end_matches('/'), request.path);
        let params = request.params.iter().filter(|(key, _)| {
            if key.as_str() == CREDENTIAL_PARAM {
                tracing::warn!(path = request.path, "dropping caller-supplied credential parameter");
                false
            } else {
                true
            }
        });

        Url::parse_with_params(&endpoint, params)
            .map_err(|e| GatewayError::Configuration(format!("invalid upstream URL: {e}")))
    }
}

#[async_trait]
impl WeatherUpstream for OpenWeatherClient {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResult, GatewayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(GatewayError::missing_credential)?;

        let public_url = self.resolve(request)?;
        let mut wire_url = public_url.clone();
        wire_url
            .query_pairs_mut()
            .append_pair(CREDENTIAL_PARAM, api_key.expose());

        tracing::debug!(url = %public_url, "calling weather provider");

        let response = self.client.get(wire_url).send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;

        if !status.is_success() {
            tracing::debug!(url = %public_url, status = status.as_u16(), "provider returned error status");
        }

        Ok(UpstreamResult {
            ok: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
            url: public_url.to_string(),
        })
    }
}
