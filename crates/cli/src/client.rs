//! Saborê backend HTTP client.
//!
//! Fetches order snapshots from the backend's order listing endpoint. The
//! backend has been deployed with and without the `/api` prefix, so
//! `/api/pedidos` is tried first and `/pedidos` only when the first answers
//! 404.
//!
//! Connection failures, timeouts and 5xx responses are retried with a linear
//! backoff. Every other failure is returned immediately.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use sabore_core::{RestaurantId, Snapshot, SnapshotError};
use thiserror::Error;
use tracing::instrument;
use url::Url;

const PRIMARY_ORDERS_PATH: &str = "api/pedidos";
const FALLBACK_ORDERS_PATH: &str = "pedidos";

/// Delay before the second attempt; multiplied by the attempt number after.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

const USER_AGENT: &str = concat!("sabore-cli/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status} for {url}")]
    Status { status: StatusCode, url: Url },

    /// Backend answered with something other than JSON.
    #[error("Backend response is not JSON (Content-Type: {content_type:?})")]
    NotJson { content_type: String },

    /// Body was JSON but not an order payload.
    #[error("Invalid order payload: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Optional filters for the order listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub restaurant_id: Option<RestaurantId>,
    /// Sent as `data_inicio`, `YYYY-MM-DD`.
    pub from: Option<NaiveDate>,
    /// Sent as `data_fim`, `YYYY-MM-DD`.
    pub to: Option<NaiveDate>,
}

impl OrderQuery {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.restaurant_id {
            pairs.push(("restaurante_id", id.to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("data_inicio", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("data_fim", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// Read-only client for the backend order endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
    retry_attempts: u32,
}

impl BackendClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// `retry_attempts` counts the first try; values below 1 are treated
    /// as 1.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration, retry_attempts: u32) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
            retry_attempts: retry_attempts.max(1),
        })
    }

    /// Full URL for an order listing `path` with `query` applied.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `path` cannot be joined onto the
    /// base URL.
    pub fn orders_url(&self, path: &str, query: &OrderQuery) -> Result<Url, ClientError> {
        let mut url = self.base_url.join(path)?;
        let pairs = query.pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Fetch every order matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Status` if both order paths fail,
    /// `ClientError::NotJson` if the backend answers with another content
    /// type, or `ClientError::Snapshot` if the body has no order array.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_orders(&self, query: &OrderQuery) -> Result<Snapshot, ClientError> {
        let primary = self.orders_url(PRIMARY_ORDERS_PATH, query)?;

        let snapshot = match self.get_snapshot(primary).await {
            Err(ClientError::Status { status, url }) if status == StatusCode::NOT_FOUND => {
                tracing::debug!(%url, "Order endpoint not found, trying fallback path");
                let fallback = self.orders_url(FALLBACK_ORDERS_PATH, query)?;
                self.get_snapshot(fallback).await?
            }
            other => other?,
        };

        tracing::info!(
            orders = snapshot.len(),
            skipped = snapshot.skipped,
            "Fetched order snapshot"
        );
        Ok(snapshot)
    }

    async fn get_snapshot(&self, url: Url) -> Result<Snapshot, ClientError> {
        let response = self.send_with_retry(&url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status, url });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !is_json(&content_type) {
            return Err(ClientError::NotJson { content_type });
        }

        let body = response.bytes().await?;
        Ok(Snapshot::from_slice(&body)?)
    }

    async fn send_with_retry(&self, url: &Url) -> Result<reqwest::Response, ClientError> {
        let mut attempt = 1;
        loop {
            let result = self
                .client
                .get(url.clone())
                .header(ACCEPT, "application/json")
                .send()
                .await;

            let transient = match &result {
                Ok(response) => response.status().is_server_error(),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if !transient || attempt >= self.retry_attempts {
                return result.map_err(ClientError::from);
            }

            tracing::warn!(
                %url,
                attempt,
                max_attempts = self.retry_attempts,
                "Transient backend failure, retrying"
            );
            tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            attempt += 1;
        }
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}
