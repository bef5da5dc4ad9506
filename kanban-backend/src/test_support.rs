//! Shared fixtures for backend tests: a fake chat-completions provider
//! served by axum on an ephemeral port, and ready-made app state.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use kanban_core::reply::LeniencyPolicy;
use kanban_core::storage::sqlite::SqliteStorage;
use kanban_core::storage::BoardStore;
use serde_json::Value;

use crate::ai::ChatOrchestrator;
use crate::config::AiConfig;
use crate::state::AppState;

#[derive(Clone)]
pub enum FakeReply {
    /// 200 with a completion whose message content is the given text.
    Content(Option<String>),
    /// Bare status code with an empty body.
    Status(StatusCode),
    /// 200 with a body that is not a completion envelope.
    RawBody(String),
}

impl FakeReply {
    pub fn content(text: &str) -> Self {
        Self::Content(Some(text.to_string()))
    }

    pub fn no_content() -> Self {
        Self::Content(None)
    }

    pub fn status(code: StatusCode) -> Self {
        Self::Status(code)
    }

    pub fn raw_body(body: &str) -> Self {
        Self::RawBody(body.to_string())
    }
}

type Recorded = Arc<Mutex<Vec<(Option<String>, Value)>>>;

#[derive(Clone)]
struct FakeState {
    reply: FakeReply,
    requests: Recorded,
}

pub struct FakeProvider {
    pub base_url: String,
    requests: Recorded,
}

impl FakeProvider {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Authorization header and JSON body of the most recent request.
    pub fn last_request(&self) -> Option<(Option<String>, Value)> {
        self.requests.lock().unwrap().last().cloned()
    }
}

async fn completions(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push((auth, body));

    match state.reply {
        FakeReply::Content(content) => Json(serde_json::json!({
            "id": "cmpl-test",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
            }],
        }))
        .into_response(),
        FakeReply::Status(code) => code.into_response(),
        FakeReply::RawBody(body) => (StatusCode::OK, body).into_response(),
    }
}

pub async fn spawn_fake_provider(reply: FakeReply) -> FakeProvider {
    let requests: Recorded = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(FakeState {
            reply,
            requests: requests.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    FakeProvider {
        base_url: format!("http://{}/v1", addr),
        requests,
    }
}

pub fn ai_config(base_url: &str) -> AiConfig {
    AiConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        api_key_env: "OPENROUTER_API_KEY".to_string(),
        api_key: Some("sk-test".to_string()),
        reply_policy: LeniencyPolicy::Lenient,
    }
}

/// Bootstrapped in-memory store plus an orchestrator pointed at `base_url`.
pub fn app_state(config: AiConfig) -> (AppState, Arc<SqliteStorage>) {
    let store = Arc::new(SqliteStorage::open_in_memory().unwrap());
    store.bootstrap().unwrap();
    let state = AppState {
        store: store.clone(),
        assistant: Arc::new(ChatOrchestrator::new(config)),
        username: store.default_username().to_string(),
    };
    (state, store)
}
