pub mod sqlite;

use crate::types::KanbanBoard;

/// Username owning the single board the service manages.
pub const DEFAULT_USERNAME: &str = "user";

/// Abstract storage trait for board backends.
/// Implementations: SqliteStorage (file or in-memory database).
///
/// Every write is a whole-document overwrite. There is no revision token,
/// so concurrent writers resolve as last-write-wins.
pub trait BoardStore: Send + Sync {
    /// Read the user's board.
    fn get(&self, username: &str) -> Result<KanbanBoard, StorageError>;

    /// Replace the user's board. The previous document is discarded.
    fn set(&self, username: &str, board: &KanbanBoard) -> Result<(), StorageError>;

    /// Create the schema, the default user, and the starter board if the
    /// user has none yet. Safe to call any number of times.
    fn bootstrap(&self) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Board not found for user: {0}")]
    BoardNotFound(String),

    #[error("Stored board document is unreadable: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::BoardNotFound(_))
    }
}
