//! Kanban backend: config loading, storage init, assistant wiring, HTTP server.

pub mod ai;
pub mod api;
pub mod config;
pub mod log_bridge;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use kanban_core::storage::sqlite::SqliteStorage;
use kanban_core::storage::BoardStore;

use crate::ai::ChatOrchestrator;
use crate::config::{AiConfig, Cli};
use crate::state::AppState;

/// Start the service and block until Ctrl-C.
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = log_bridge::init() {
        eprintln!("failed to initialize backend logger: {}", e);
    }

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut config = config::load_config(&config_path);
    config.apply_cli(&cli);

    if let Some(path) = &config.log_file {
        if let Err(e) = log_bridge::attach_file(path) {
            log::warn!(target: "kanban.log", "Failed to open log file {}: {}", path.display(), e);
        }
    }

    let store = SqliteStorage::open(&config.database_path)?.with_default_username(&config.username);
    store.bootstrap()?;
    log::info!(
        target: "kanban.store",
        "Using database {}",
        config.database_path.display()
    );

    let ai_config = AiConfig::from_env(&config.ai);
    if ai_config.api_key.is_none() {
        log::warn!(
            target: "kanban.ai",
            "{} is not set; AI endpoints will fail until it is provided",
            ai_config.api_key_env
        );
    }

    let state = AppState {
        store: Arc::new(store),
        assistant: Arc::new(ChatOrchestrator::new(ai_config)),
        username: config.username.clone(),
    };

    let handle = server::spawn_server(state, &config.bind_address, config.port).await?;
    log::info!(target: "kanban.server", "Server started on port {}", handle.port);

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "kanban.shutdown", "Failed to listen for Ctrl-C: {}", e);
    }
    log::info!(target: "kanban.shutdown", "Shutting down");
    let _ = handle.shutdown_tx.send(true);
    let _ = handle.task.await;
    Ok(())
}
