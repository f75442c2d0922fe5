//! Scriptable stand-in for the KeyChanger HTTP service
//!
//! Serves `/`, `/analyze` and `/transpose` on an ephemeral localhost port and
//! records every multipart upload it receives.

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Canned response for one route
#[derive(Debug, Clone)]
pub enum MockReply {
    Json(u16, Value),
    Text(u16, String),
    Audio(u16, Vec<u8>),
}

impl MockReply {
    pub fn key(key: &str, confidence: f64) -> Self {
        MockReply::Json(200, json!({ "key": key, "confidence": confidence }))
    }

    pub fn detail(status: u16, detail: &str) -> Self {
        MockReply::Json(status, json!({ "detail": detail }))
    }

    fn into_response(self) -> Response {
        match self {
            MockReply::Json(status, body) => (status_code(status), Json(body)).into_response(),
            MockReply::Text(status, body) => (
                status_code(status),
                [(header::CONTENT_TYPE, "text/plain")],
                body,
            )
                .into_response(),
            MockReply::Audio(status, body) => (
                status_code(status),
                [(header::CONTENT_TYPE, "audio/mpeg")],
                body,
            )
                .into_response(),
        }
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap()
}

/// One multipart upload as the server saw it
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub path: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub file_len: usize,
    pub fields: HashMap<String, String>,
}

struct MockState {
    analyze: Mutex<MockReply>,
    transpose: Mutex<MockReply>,
    delay: Mutex<Duration>,
    received: Mutex<Vec<ReceivedUpload>>,
}

pub struct MockService {
    pub base_url: String,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockService {
    /// Serve `analyze` and `transpose` immediately
    pub async fn start(analyze: MockReply, transpose: MockReply) -> Self {
        let state = Arc::new(MockState {
            analyze: Mutex::new(analyze),
            transpose: Mutex::new(transpose),
            delay: Mutex::new(Duration::ZERO),
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/", get(health))
            .route("/analyze", post(analyze_handler))
            .route("/transpose", post(transpose_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    /// Hold every upload response for `delay` before replying
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    pub fn set_analyze(&self, reply: MockReply) {
        *self.state.analyze.lock().unwrap() = reply;
    }

    pub fn set_transpose(&self, reply: MockReply) {
        *self.state.transpose.lock().unwrap() = reply;
    }

    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn upload_count(&self, path: &str) -> usize {
        self.uploads().iter().filter(|u| u.path == path).count()
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Base URL of a localhost port nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "KeyChanger API" }))
}

async fn analyze_handler(State(state): State<Arc<MockState>>, multipart: Multipart) -> Response {
    record_upload(&state, "/analyze", multipart).await;
    let reply = state.analyze.lock().unwrap().clone();
    reply.into_response()
}

async fn transpose_handler(State(state): State<Arc<MockState>>, multipart: Multipart) -> Response {
    record_upload(&state, "/transpose", multipart).await;
    let reply = state.transpose.lock().unwrap().clone();
    reply.into_response()
}

async fn record_upload(state: &MockState, path: &str, mut multipart: Multipart) {
    let mut upload = ReceivedUpload {
        path: path.to_string(),
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            upload.file_name = field.file_name().map(str::to_string);
            upload.content_type = field.content_type().map(str::to_string);
            upload.file_len = field.bytes().await.unwrap().len();
        } else {
            let value = field.text().await.unwrap();
            upload.fields.insert(name, value);
        }
    }

    state.received.lock().unwrap().push(upload);

    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
