//! HTTP delivery of record batches to the collector.
//!
//! The transport makes exactly one delivery attempt per call: retry policy
//! lives in the coordinator (via requeue), not here. A batch is one `POST`
//! to `{base_url}/api/logs/batch` carrying `{"logs": [...]}` with the
//! configured API key, bounded by the per-request timeout.
//!
//! Failure reasons are distinguished for diagnostics (invalid URL, HTTP
//! status outside 2xx, underlying transport error) but collapse into one
//! binary outcome at the flush site — the coordinator never branches its
//! retry policy on the failure subtype.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

use crate::record::LogRecord;

/// Path of the batch intake endpoint, relative to the collector base URL.
pub const BATCH_PATH: &str = "/api/logs/batch";
/// Header carrying the collector API key.
const API_KEY_HEADER: &str = "X-API-Key";

/// Errors produced by a send attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid collector URL: {0}")]
    InvalidUrl(String),
    #[error("collector returned HTTP {0}")]
    Http(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Seam for batch delivery.
///
/// Implementations send the whole batch as one unit and make exactly one
/// attempt per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers `records` as a single batch. An empty batch succeeds
    /// trivially without any I/O.
    async fn send(&self, records: &[LogRecord]) -> Result<(), TransportError>;
}

#[derive(Serialize)]
struct BatchPayload<'a> {
    logs: &'a [LogRecord],
}

/// Reqwest-backed [`Transport`] for a single collector endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    api_key: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds a transport for the given collector base URL.
    ///
    /// The batch endpoint URL is resolved eagerly so a malformed base URL is
    /// reported at construction rather than on the first flush.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), BATCH_PATH);
        let url = Url::parse(&endpoint)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(HttpTransport {
            client: reqwest::Client::new(),
            url,
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// The resolved batch endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, records: &[LogRecord]) -> Result<(), TransportError> {
        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&BatchPayload { logs: records })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Http(status))
        }
    }
}
