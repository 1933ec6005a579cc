//! HttpOverrideServiceClient - REST client for the external override service.
//!
//! Endpoints (relative to the configured base URL):
//! - `POST /v1/set-location` with `{latitude, longitude, device_id, timestamp, app_version}`
//! - `POST /v1/stop-location` with `{device_id, timestamp}`
//!
//! Both are authenticated with `Authorization: Bearer <token>`.

use async_trait::async_trait;
use geoport_core::config::ServiceConfig;
use geoport_core::error::{GeoportError, Result};
use geoport_core::mechanism::{
    OverrideServiceClient, SetLocationRequest, StopLocationRequest, map_status,
};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const SET_LOCATION_PATH: &str = "/v1/set-location";
const STOP_LOCATION_PATH: &str = "/v1/stop-location";

/// reqwest implementation of [`OverrideServiceClient`].
#[derive(Clone)]
pub struct HttpOverrideServiceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpOverrideServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, token: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() { "timed out" } else { "failed" };
                tracing::warn!(
                    target: "geoport::mechanism",
                    url = %url,
                    "Override service request {}: {}",
                    reason,
                    e
                );
                GeoportError::remote_unavailable(format!("request to {} {}: {}", url, reason, e))
            })?;

        let status = response.status().as_u16();
        tracing::debug!(
            target: "geoport::mechanism",
            url = %url,
            status,
            "Override service answered"
        );
        map_status(status)
    }
}

#[async_trait]
impl OverrideServiceClient for HttpOverrideServiceClient {
    async fn set_location(&self, token: &str, request: &SetLocationRequest) -> Result<()> {
        self.post(SET_LOCATION_PATH, token, request).await
    }

    async fn stop_location(&self, token: &str, request: &StopLocationRequest) -> Result<()> {
        self.post(STOP_LOCATION_PATH, token, request).await
    }
}
