//! Shared test utilities
//!
//! Stands up a scripted doppelganger backend on a local port and records
//! every request the client sends, so the tests can assert on exact wire
//! bodies without a real backend.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};

/// One request captured by the mock backend
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Request body as text (multipart bodies are mostly printable)
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Scripted replies, keyed by endpoint: `(status, body)`
///
/// Unscripted endpoints answer 404 so a test fails loudly when the client
/// hits something unexpected.
#[derive(Debug, Clone, Default)]
pub struct MockReplies {
    pub train: Option<(u16, String)>,
    pub chat: Option<(u16, String)>,
    pub transcribe: Option<(u16, String)>,
    pub voice_chat: Option<(u16, String)>,
    pub memories: Option<(u16, String)>,
    pub docs_ok: bool,
}

#[derive(Clone)]
struct MockState {
    replies: Arc<MockReplies>,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// A running mock backend; the server task is aborted on drop
pub struct MockBackend {
    pub base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Bind a fresh port and serve the scripted replies
    pub async fn spawn(replies: MockReplies) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            replies: Arc::new(replies),
            captured: Arc::clone(&captured),
        };

        let app = Router::new()
            .route("/train", post(handle_train))
            .route("/chat", post(handle_chat))
            .route("/transcribe", post(handle_transcribe))
            .route("/voice-chat", post(handle_voice_chat))
            .route("/memories", get(handle_memories))
            .route("/docs", get(handle_docs))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            base_url: format!("http://{addr}"),
            captured,
            handle,
        }
    }

    /// Everything the client sent, in arrival order
    #[must_use]
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.captured.lock().expect("captured lock").clone()
    }

    /// Captured requests for one path
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.captured()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// An address nothing listens on, for connection-failure tests
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe local addr");
    drop(listener);
    format!("http://{addr}")
}

fn respond(
    state: &MockState,
    path: &str,
    headers: &HeaderMap,
    body: &[u8],
    reply: Option<&(u16, String)>,
) -> (StatusCode, String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    state
        .captured
        .lock()
        .expect("captured lock")
        .push(CapturedRequest {
            path: path.to_string(),
            content_type,
            body: body.to_vec(),
        });

    reply.map_or(
        (StatusCode::NOT_FOUND, "not scripted".to_string()),
        |(status, body)| {
            (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body.clone(),
            )
        },
    )
}

async fn handle_train(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    respond(&state, "/train", &headers, &body, state.replies.train.as_ref())
}

async fn handle_chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    respond(&state, "/chat", &headers, &body, state.replies.chat.as_ref())
}

async fn handle_transcribe(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    respond(
        &state,
        "/transcribe",
        &headers,
        &body,
        state.replies.transcribe.as_ref(),
    )
}

async fn handle_voice_chat(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    respond(
        &state,
        "/voice-chat",
        &headers,
        &body,
        state.replies.voice_chat.as_ref(),
    )
}

async fn handle_memories(
    State(state): State<MockState>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    respond(
        &state,
        "/memories",
        &headers,
        &[],
        state.replies.memories.as_ref(),
    )
}

async fn handle_docs(State(state): State<MockState>, headers: HeaderMap) -> (StatusCode, String) {
    let reply = if state.replies.docs_ok {
        Some((200, String::new()))
    } else {
        None
    };
    respond(&state, "/docs", &headers, &[], reply.as_ref())
}
