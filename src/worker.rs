use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::WorkerConfig;

/// Why a dispatch attempt failed. Each variant maps to one metric label via
/// [`DispatchError::kind`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("worker returned HTTP {0}")]
    Http(StatusCode),
    #[error("worker unreachable: {0}")]
    Network(reqwest::Error),
    #[error("worker request timed out after {0:?}")]
    Timeout(Duration),
    #[error("worker request failed: {0}")]
    Unknown(reqwest::Error),
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Http(_) => "http_error",
            DispatchError::Network(_) => "network_error",
            DispatchError::Timeout(_) => "timeout",
            DispatchError::Unknown(_) => "unknown_error",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DispatchRequest<'a> {
    url: &'a str,
    channel_id: &'a str,
}

/// HTTP client for the downloader worker service. One instance is built at
/// startup from config and shared by the pipeline and the ops server.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WorkerClient {
    pub fn new(config: &WorkerConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build worker HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Send one matched link to the worker. A single attempt, no retry; the
    /// caller treats any failure as terminal for that message.
    pub async fn dispatch(&self, url: &str, channel_id: &str) -> Result<(), DispatchError> {
        let endpoint = format!("{}/videos", self.base_url);

        debug!(endpoint = %endpoint, url = %url, channel_id = %channel_id, "Dispatching to worker");

        let response = self
            .client
            .post(&endpoint)
            .json(&DispatchRequest { url, channel_id })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Http(status));
        }

        Ok(())
    }

    /// Liveness probe against the worker. Never errors; any failure reads as
    /// "down". Used by operational tooling, not by the dispatch pipeline.
    pub async fn check_health(&self) -> bool {
        let endpoint = format!("{}/health", self.base_url);

        match self.client.get(&endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Worker health check failed: {}", e);
                false
            }
        }
    }

    fn classify(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout)
        } else if err.is_connect() {
            DispatchError::Network(err)
        } else {
            DispatchError::Unknown(err)
        }
    }
}
