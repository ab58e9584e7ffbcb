//! Shared helpers for the lexref end-to-end test suite.
//!
//! Provides [`spawn_backend`], which binds a `TcpListener` on an ephemeral
//! port and serves the three lookup endpoints of the legal-data backend from
//! in-memory [`Fixtures`]. Every request path is logged so tests can assert
//! how many calls the pipeline made.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::Mutex;

/// Canned backend data.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    /// case id → title
    pub titles: HashMap<String, String>,
    /// case id → paragraphs
    pub case_texts: HashMap<String, Vec<String>>,
    /// (act, section key) → statutory text
    pub code_texts: HashMap<(String, String), String>,
}

impl Fixtures {
    pub fn with_title(mut self, case_id: &str, title: &str) -> Self {
        self.titles.insert(case_id.into(), title.into());
        self
    }

    pub fn with_case_text(mut self, case_id: &str, paragraphs: &[&str]) -> Self {
        self.case_texts.insert(
            case_id.into(),
            paragraphs.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    pub fn with_code_text(mut self, act: &str, section: &str, text: &str) -> Self {
        self.code_texts
            .insert((act.into(), section.into()), text.into());
        self
    }
}

/// What the mock backend serves and what it has been asked for.
#[derive(Debug, Default)]
pub struct MockBackend {
    fixtures: Fixtures,
    requests: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Decoded request paths, in arrival order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub async fn count(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|p| p.starts_with(prefix))
            .count()
    }

    async fn record(&self, path: String) {
        self.requests.lock().await.push(path);
    }
}

/// Start an ephemeral in-process backend and return `(base_url, backend)`.
///
/// The server runs in a background `tokio` task bound to an OS-assigned
/// port on `127.0.0.1`, e.g. `http://127.0.0.1:51234`.
///
/// A title request for an unknown case answers `200 {"error": …}`, the way
/// the real backend does; unknown case or code texts answer `404`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound or the server fails to start.
pub async fn spawn_backend(fixtures: Fixtures) -> (String, Arc<MockBackend>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let backend = Arc::new(MockBackend {
        fixtures,
        requests: Mutex::new(Vec::new()),
    });

    let router = Router::new()
        .route("/fetch-case-title/{case_id}", get(case_title))
        .route("/fetch-case-text/{case_id}", get(case_text))
        .route("/fetch-code-text/{act}/{section}", get(code_text))
        .with_state(Arc::clone(&backend));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("mock backend error");
    });

    (base_url, backend)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn case_title(
    State(backend): State<Arc<MockBackend>>,
    Path(case_id): Path<String>,
) -> Response {
    backend
        .record(format!("/fetch-case-title/{case_id}"))
        .await;
    match backend.fixtures.titles.get(&case_id) {
        Some(title) => Json(json!({ "title": title })).into_response(),
        None => Json(json!({ "error": "Case not found" })).into_response(),
    }
}

async fn case_text(
    State(backend): State<Arc<MockBackend>>,
    Path(case_id): Path<String>,
) -> Response {
    backend
        .record(format!("/fetch-case-text/{case_id}"))
        .await;
    match backend.fixtures.case_texts.get(&case_id) {
        Some(paragraphs) => Json(json!({ "paragraphs": paragraphs })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn code_text(
    State(backend): State<Arc<MockBackend>>,
    Path((act, section)): Path<(String, String)>,
) -> Response {
    backend
        .record(format!("/fetch-code-text/{act}/{section}"))
        .await;
    match backend.fixtures.code_texts.get(&(act, section)) {
        Some(text) => Json(json!({ "content": text })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
