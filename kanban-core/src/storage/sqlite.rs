/// SQLite storage backend.
///
/// Two tables: `users` (unique username) and `boards` (one JSON document per
/// user, cascading on user deletion). Statements run on a single
/// mutex-guarded connection, so each read or write is atomic on its own and
/// nothing more.
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use super::{BoardStore, StorageError, DEFAULT_USERNAME};
use crate::seed::seed_board;
use crate::types::KanbanBoard;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    username   TEXT    NOT NULL UNIQUE,
    created_at TEXT    NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS boards (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    data       TEXT    NOT NULL,
    updated_at TEXT    NOT NULL DEFAULT (datetime('now'))
);
"#;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
    default_username: String,
}

impl SqliteStorage {
    /// Open or create a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!(
                        target: "kanban.store",
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    );
                }
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Private in-memory database, gone when dropped.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            default_username: DEFAULT_USERNAME.to_string(),
        })
    }

    /// Seed a different user than `DEFAULT_USERNAME` during bootstrap.
    pub fn with_default_username(mut self, username: impl Into<String>) -> Self {
        self.default_username = username.into();
        self
    }

    pub fn default_username(&self) -> &str {
        &self.default_username
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn user_id(conn: &Connection, username: &str) -> Result<Option<i64>, StorageError> {
        let id = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    #[cfg(test)]
    fn board_count(&self, username: &str) -> Result<usize, StorageError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM boards b JOIN users u ON u.id = b.user_id WHERE u.username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl BoardStore for SqliteStorage {
    fn get(&self, username: &str) -> Result<KanbanBoard, StorageError> {
        let conn = self.lock()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT b.data FROM boards b
                 JOIN users u ON u.id = b.user_id
                 WHERE u.username = ?1
                 ORDER BY b.id
                 LIMIT 1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(StorageError::BoardNotFound(username.to_string())),
        }
    }

    fn set(&self, username: &str, board: &KanbanBoard) -> Result<(), StorageError> {
        let data = serde_json::to_string(board)?;
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE boards SET data = ?1, updated_at = datetime('now')
             WHERE user_id = (SELECT id FROM users WHERE username = ?2)",
            params![data, username],
        )?;
        if updated > 0 {
            log::debug!(target: "kanban.store", "Replaced board for {}", username);
            return Ok(());
        }
        match Self::user_id(&conn, username)? {
            Some(_) => Err(StorageError::BoardNotFound(username.to_string())),
            None => Err(StorageError::UserNotFound(username.to_string())),
        }
    }

    fn bootstrap(&self) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            params![self.default_username],
        )?;
        let user_id = Self::user_id(&tx, &self.default_username)?
            .ok_or_else(|| StorageError::UserNotFound(self.default_username.clone()))?;
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM boards WHERE user_id = ?1 LIMIT 1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_none() {
            let data = serde_json::to_string(&seed_board())?;
            tx.execute(
                "INSERT INTO boards (user_id, data) VALUES (?1, ?2)",
                params![user_id, data],
            )?;
            log::info!(
                target: "kanban.store",
                "Seeded starter board for {}",
                self.default_username
            );
        }
        tx.commit()?;
        Ok(())
    }
}
