use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use kanban_core::reconcile::BoardValidationError;
use kanban_core::storage::StorageError;
use serde::Serialize;

mod assistant;
mod board;

use crate::ai::ChatError;
use crate::state::AppState;

/// Axum REST API routes, mounted under `/api`.
///
///   GET  /test      -> health check
///   GET  /board     -> the stored board (+ ETag)
///   PUT  /board     -> replace the stored board
///   POST /ai/chat   -> grounded assistant turn, may replace the board
///   POST /ai/test   -> ungrounded single prompt
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/test", get(health))
        .route("/board", get(board::get_board).put(board::put_board))
        .route("/ai/chat", post(assistant::chat))
        .route("/ai/test", post(assistant::test_prompt))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "API is working", "status": "success" }))
}

// ── Shared types and helpers used across sub-modules ────────────────────

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every failure a handler can surface, matched to a status in one place.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    /// Request body did not match the expected shape.
    #[error("{0}")]
    Validation(String),

    #[error("board rejected ({kind}): {0}", kind = .0.invariant())]
    BoardRejected(#[from] BoardValidationError),

    #[error("{0}")]
    Config(String),

    /// Details are logged, not returned.
    #[error("AI provider request failed")]
    Provider(String),

    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::BoardRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Config(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else {
            Self::Storage(e.to_string())
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        let message = e.to_string();
        match e {
            ChatError::Config(_) => Self::Config(message),
            ChatError::Provider(detail) => Self::Provider(detail),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        match &self {
            Self::Provider(detail) => {
                log_api_issue(status, "kanban.api", format!("{}: {}", error, detail))
            }
            _ => log_api_issue(status, "kanban.api", &error),
        }
        (status, Json(ErrorResponse { error })).into_response()
    }
}

fn insert_header_safe(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match value.parse() {
        Ok(parsed) => {
            headers.insert(name, parsed);
        }
        Err(e) => {
            log::warn!("Failed to set header {}={} ({})", name, value, e);
        }
    }
}

fn log_api_issue(status: StatusCode, target: &'static str, message: impl AsRef<str>) {
    let message = message.as_ref();
    if status.is_server_error() {
        log::error!(target: target, "{}", message);
    } else {
        log::warn!(target: target, "{}", message);
    }
}
