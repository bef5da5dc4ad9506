/// Shared application state passed to axum handlers.
use std::sync::Arc;

use kanban_core::storage::BoardStore;

use crate::ai::ChatOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BoardStore>,
    pub assistant: Arc<ChatOrchestrator>,
    /// Owner of the single board every request operates on.
    pub username: String,
}
