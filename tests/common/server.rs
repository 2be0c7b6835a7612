//! Fake approval backend lifecycle management
//!
//! Serves the approval API over HTTP on top of an [`InMemoryApprovalApi`], so
//! server-side re-validation behaves like the real backend. Individual
//! subjects can be scripted to answer transitions with a canned response.

use super::constants::*;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use onboarding_approvals::remote::{DocumentReview, TransitionRequest};
use onboarding_approvals::workflow::Subject;
use onboarding_approvals::{ApprovalApi, InMemoryApprovalApi, RemoteError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Canned answer for `POST /subjects/{id}/transitions`.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Respond with `status` and a JSON body.
    Json {
        status: u16,
        body: serde_json::Value,
    },
    /// Respond with `status` and a plain-text body.
    Text { status: u16, body: String },
    /// Wait before handling the request normally.
    Stall(Duration),
}

#[derive(Clone)]
struct AppState {
    backend: Arc<InMemoryApprovalApi>,
    scripted: Arc<Mutex<HashMap<String, ScriptedResponse>>>,
    authorizations: Arc<Mutex<Vec<Option<String>>>>,
}

impl AppState {
    fn record_authorization(&self, headers: &HeaderMap) {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.authorizations.lock().unwrap().push(value);
    }

    fn script_for(&self, subject_id: &str) -> Option<ScriptedResponse> {
        self.scripted.lock().unwrap().get(subject_id).cloned()
    }
}

/// Renders backend errors the way the real service does: structured errors
/// as `{code, message}`, missing resources as `{error}`, everything else as
/// plain text.
fn error_response(err: RemoteError) -> Response {
    match err {
        RemoteError::Rejected {
            status,
            code,
            message,
        } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            match code {
                Some(code) => (
                    status,
                    Json(serde_json::json!({ "code": code, "message": message })),
                )
                    .into_response(),
                None if status == StatusCode::NOT_FOUND => {
                    (status, Json(serde_json::json!({ "error": message }))).into_response()
                }
                None => (status, message).into_response(),
            }
        }
        other => (StatusCode::BAD_GATEWAY, other.to_string()).into_response(),
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn get_subject(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(subject_id): Path<String>,
) -> Response {
    state.record_authorization(&headers);
    match state.backend.get_subject(&subject_id).await {
        Ok(subject) => Json(subject).into_response(),
        Err(err) => error_response(err),
    }
}

async fn post_transition(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(subject_id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Response {
    state.record_authorization(&headers);
    match state.script_for(&subject_id) {
        Some(ScriptedResponse::Json { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap();
            return (status, Json(body)).into_response();
        }
        Some(ScriptedResponse::Text { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap();
            return (status, body).into_response();
        }
        Some(ScriptedResponse::Stall(delay)) => tokio::time::sleep(delay).await,
        None => {}
    }

    match state.backend.transition(&subject_id, &request).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

async fn post_document_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((subject_id, document_id)): Path<(String, String)>,
    Json(review): Json<DocumentReview>,
) -> Response {
    state.record_authorization(&headers);
    match state
        .backend
        .review_document(&subject_id, &document_id, &review)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn make_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/subjects/{subject_id}", get(get_subject))
        .route("/api/subjects/{subject_id}/transitions", post(post_transition))
        .route(
            "/api/subjects/{subject_id}/documents/{document_id}/review",
            post(post_document_review),
        )
        .with_state(state)
}

/// Fake approval backend bound to a random local port.
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL of the approval API (e.g., "http://127.0.0.1:12345/api")
    pub api_url: String,

    /// The port the server is listening on
    pub port: u16,

    state: AppState,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a fake backend holding `subjects`.
    pub async fn spawn(subjects: Vec<Subject>) -> Self {
        Self::spawn_with_backend(InMemoryApprovalApi::new(subjects)).await
    }

    /// Spawns a fake backend around a preconfigured in-memory backend, e.g.
    /// one with latency or injected failures.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the server doesn't become ready
    /// within [`SERVER_READY_TIMEOUT_MS`].
    pub async fn spawn_with_backend(backend: InMemoryApprovalApi) -> Self {
        let state = AppState {
            backend: Arc::new(backend),
            scripted: Arc::new(Mutex::new(HashMap::new())),
            authorizations: Arc::new(Mutex::new(Vec::new())),
        };

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(state.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            api_url: format!("http://127.0.0.1:{}/api", port),
            port,
            state,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// The in-memory backend behind the HTTP surface.
    pub fn backend(&self) -> &InMemoryApprovalApi {
        &self.state.backend
    }

    /// Answer every transition on `subject_id` with `response`.
    pub fn script_transition(&self, subject_id: &str, response: ScriptedResponse) {
        self.state
            .scripted
            .lock()
            .unwrap()
            .insert(subject_id.to_string(), response);
    }

    /// `Authorization` header of every API request received so far.
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state.authorizations.lock().unwrap().clone()
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let url = format!("http://127.0.0.1:{}/health", self.port);
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!("Server did not become ready within {:?}", timeout);
            }

            if let Ok(response) = client.get(&url).send().await {
                if response.status().is_success() {
                    return;
                }
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
