use crate::api::api_router;
use crate::state::AppState;
/// HTTP server: spawns axum on a background tokio task.
use axum::Router;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

pub struct ServerHandle {
    pub port: u16,
    pub shutdown_tx: watch::Sender<bool>,
    pub task: JoinHandle<()>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_router())
        .layer(cors)
        .with_state(state)
}

pub async fn spawn_server(
    state: AppState,
    bind_addr: &str,
    port: u16,
) -> Result<ServerHandle, Box<dyn std::error::Error>> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    let actual_port = listener.local_addr()?.port();

    log::info!(
        target: "kanban.server",
        "HTTP server listening on http://{}:{}",
        bind_addr,
        actual_port
    );

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let shutdown = async move {
            let _ = shutdown_rx.changed().await;
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            log::error!(target: "kanban.server", "HTTP server exited with error: {}", e);
        }
    });

    Ok(ServerHandle {
        port: actual_port,
        shutdown_tx,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ai_config, app_state};

    #[tokio::test]
    async fn test_spawned_server_serves_board_and_shuts_down() {
        let (state, _) = app_state(ai_config("http://127.0.0.1:1"));
        let handle = spawn_server(state, "127.0.0.1", 0).await.unwrap();
        assert_ne!(handle.port, 0);

        let url = format!("http://127.0.0.1:{}/api/board", handle.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let board: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(board["columns"].as_array().unwrap().len(), 5);

        handle.shutdown_tx.send(true).unwrap();
        handle.task.await.unwrap();
    }
}
