//! Open-Meteo HTTP client with failure containment.
//!
//! Every failure class on the wire (connect error, timeout, non-2xx status,
//! unparseable body) collapses into one absence signal for callers; the
//! distinction survives only in a warn-level log line.

use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;

use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client, UPSTREAM_TIMEOUT};

pub const OPENMETEO_API_BASE: &str = "https://api.open-meteo.com/v1";

/// Internal failure classification, logged but never surfaced to callers.
#[derive(Debug, Error)]
enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream status {0}")]
    Status(reqwest::StatusCode),
}

/// Seam between tool handlers and the wire, so handlers can be exercised
/// against stubs in tests. `query` is a path-and-query string relative to the
/// client's base, e.g. `/forecast?latitude=52.52&...`.
#[async_trait::async_trait]
pub trait WeatherApi: Send + Sync + 'static {
    async fn fetch(&self, query: &str) -> Option<JsonValue>;
}

#[derive(Clone)]
pub struct OpenMeteoClient {
    base: String,
    http: Client,
}

impl OpenMeteoClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_timeout(base, UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(timeout),
        }
    }

    /// One GET, one answer: the decoded payload as received, or `None` on any
    /// failure. Nothing is retried.
    pub async fn fetch(&self, query: &str) -> Option<JsonValue> {
        match self.fetch_inner(query).await {
            Ok(payload) => Some(payload),
            Err(err) => {
                tracing::warn!(error = %err, query, "open-meteo request failed");
                None
            }
        }
    }

    async fn fetch_inner(&self, query: &str) -> Result<JsonValue, FetchError> {
        let url = format!("{}{}", self.base.trim_end_matches('/'), query);
        let resp = add_standard_headers(self.http.get(url)).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }
        Ok(resp.json::<JsonValue>().await?)
    }
}

#[async_trait::async_trait]
impl WeatherApi for OpenMeteoClient {
    async fn fetch(&self, query: &str) -> Option<JsonValue> {
        OpenMeteoClient::fetch(self, query).await
    }
}
