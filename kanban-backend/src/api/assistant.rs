use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use kanban_core::reconcile::validate_board;
use kanban_core::types::{ChatRequest, ChatResult};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TestPromptBody {
    prompt: String,
}

#[derive(Serialize)]
pub struct TestPromptResponse {
    response: String,
}

/// POST /ai/chat -- one assistant turn grounded in the submitted board.
///
/// A returned board must pass the reconciliation gate; only then does it
/// replace the stored board. A rejected board is reported, never saved.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResult>, ApiError> {
    let Json(request) = payload?;
    let result = state
        .assistant
        .ask(&request.board, &request.message, &request.history)
        .await?;

    if let Some(board) = &result.board {
        let report = validate_board(board)?;
        if !report.orphaned_cards.is_empty() {
            log::warn!(
                target: "kanban.api.chat",
                "Assistant board leaves cards outside any column: {}",
                report.orphaned_cards.join(", ")
            );
        }
        state.store.set(&state.username, board)?;
        log::info!(
            target: "kanban.api.chat",
            "Assistant replaced board: {} columns, {} cards",
            board.columns.len(),
            board.cards.len()
        );
    }

    Ok(Json(result))
}

/// POST /ai/test -- ungrounded prompt, raw text back.
pub async fn test_prompt(
    State(state): State<AppState>,
    payload: Result<Json<TestPromptBody>, JsonRejection>,
) -> Result<Json<TestPromptResponse>, ApiError> {
    let Json(body) = payload?;
    let response = state.assistant.query(&body.prompt).await?;
    Ok(Json(TestPromptResponse { response }))
}
