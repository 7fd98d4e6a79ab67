//! Integration test support for Saborê analytics.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sabore-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `snapshot_analysis` - Backend payloads decoded and analyzed end to end
//! - `backend_client` - The CLI's HTTP client against [`StubBackend`]
//!
//! No external services are needed; the backend is replaced by an
//! in-process `axum` server bound to a random local port.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, TimeZone, Utc};
use sabore_core::Snapshot;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// A payload shaped like the backend's order listing, with the usual
/// irregularities: numeric strings, missing totals, bad timestamps and a
/// stray non-object element.
pub const SAMPLE_PAYLOAD: &str = r#"[
    {"id": 101, "data_pedido": "2024-06-03T12:15:00-03:00", "valor_total": 52.0,
     "cliente": "Ana", "status": "ENTREGUE",
     "itens": [
        {"nome": "X-Burger", "preco_unitario": 22.0, "quantidade": 2},
        {"nome": "Fries", "preco_unitario": 8.0, "quantidade": 1}
     ]},
    {"id": "102", "data_pedido": "2024-06-03 12:40:00", "valor_total": "25.50",
     "itens": [{"nome": "X-Burger", "valor": 22.0, "quantidade": "1"}]},
    {"id": 103, "data_pedido": "2024-06-09T19:05:00",
     "itens": [{"nome": "Açaí", "valor": 15, "quantidade": 2},
               {"valor": 5, "quantidade": 2}]},
    {"id": 104, "data_pedido": "2024-05-20", "valor_total": 30},
    {"id": 105, "data_pedido": "ontem", "valor_total": 12.5},
    {"id": 106, "valor_total": null, "itens": "none"},
    "corrupted"
]"#;

/// Reference instant the sample payload is analyzed against.
///
/// # Panics
///
/// Never; the date is a valid constant.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
}

/// Decode [`SAMPLE_PAYLOAD`].
///
/// # Panics
///
/// Panics if the constant payload stops decoding.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn sample_snapshot() -> Snapshot {
    Snapshot::from_slice(SAMPLE_PAYLOAD.as_bytes()).unwrap()
}

// =============================================================================
// Stub backend
// =============================================================================

/// One canned HTTP response.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl StubResponse {
    /// `200 OK` with a JSON body.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    /// `200 OK` with an HTML body.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }
    }

    /// Empty body with the given status.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
        }
    }
}

impl IntoResponse for StubResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Shared state for the stub router.
#[derive(Clone, Default)]
struct StubState {
    queue: Arc<Mutex<VecDeque<StubResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

/// HTTP server answering each request with the next queued response. Once
/// the queue is empty every request gets a 404.
pub struct StubBackend {
    addr: SocketAddr,
    state: StubState,
    task: JoinHandle<()>,
}

impl StubBackend {
    /// Bind to a random local port and start serving `responses` in order.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn start(responses: Vec<StubResponse>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = StubState {
            queue: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::default(),
        };

        let app = Router::new().fallback(respond).with_state(state.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// Base URL of the stub, e.g. `http://127.0.0.1:43211/`.
    ///
    /// # Panics
    ///
    /// Never; a socket address always forms a valid URL.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    /// Request targets received so far (path and query), in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(State(state): State<StubState>, uri: Uri) -> StubResponse {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), ToString::to_string);
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(target);
    }

    state
        .queue
        .lock()
        .ok()
        .and_then(|mut queue| queue.pop_front())
        .unwrap_or_else(|| StubResponse::status(404))
}
