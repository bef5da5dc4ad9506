use clap::Parser;
use kanban_backend::config::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = kanban_backend::run(cli).await {
        log::error!("error while running kanban-backend: {}", e);
        eprintln!("error while running kanban-backend: {}", e);
        std::process::exit(1);
    }
}
