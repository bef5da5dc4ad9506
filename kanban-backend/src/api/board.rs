use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use kanban_core::reconcile::validate_board;
use kanban_core::types::KanbanBoard;

use super::{insert_header_safe, ApiError};
use crate::state::AppState;

/// GET /board -- the stored board, with a content-hash ETag.
pub async fn get_board(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let board = state.store.get(&state.username)?;
    let hash = board
        .content_hash()
        .map_err(|e| ApiError::Storage(format!("Failed to hash board: {}", e)))?;
    let etag = format!("\"{}\"", hash);

    let mut resp_headers = HeaderMap::new();
    insert_header_safe(&mut resp_headers, "etag", &etag);

    // Check If-None-Match for conditional response
    if let Some(if_none_match) = headers.get("if-none-match") {
        if let Ok(value) = if_none_match.to_str() {
            if etag_matches(value, &etag) {
                return Ok((StatusCode::NOT_MODIFIED, resp_headers).into_response());
            }
        }
    }

    Ok((StatusCode::OK, resp_headers, Json(board)).into_response())
}

/// Weak comparison of an `If-None-Match` list against our entity tag.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// PUT /board -- replace the stored board wholesale.
pub async fn put_board(
    State(state): State<AppState>,
    payload: Result<Json<KanbanBoard>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(board) = payload?;
    let report = validate_board(&board)?;
    if !report.orphaned_cards.is_empty() {
        log::warn!(
            target: "kanban.api.board",
            "Saving board with cards outside any column: {}",
            report.orphaned_cards.join(", ")
        );
    }

    state.store.set(&state.username, &board)?;
    log::info!(
        target: "kanban.api.board",
        "Board replaced: {} columns, {} cards",
        board.columns.len(),
        board.cards.len()
    );
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::etag_matches;

    #[test]
    fn test_etag_matches_weak_list_and_wildcard() {
        let etag = "\"abc\"";
        assert!(etag_matches("\"abc\"", etag));
        assert!(etag_matches("W/\"abc\"", etag));
        assert!(etag_matches("\"old\", W/\"abc\"", etag));
        assert!(etag_matches("*", etag));
        assert!(!etag_matches("\"old\"", etag));
        assert!(!etag_matches("abc", etag));
    }
}
