use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use heartrest::config::{Config, ReplyMode};
use heartrest::history::{ConversationStore, MemoryStore};
use heartrest::server::{AppState, router};
use heartrest::service::ChatService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();

    let service = ChatService::new(&config).context("Failed to create chat service")?;
    let history = ConversationStore::new(Arc::new(MemoryStore::new()), config.history.max_entries);
    let state = AppState {
        service: Arc::new(service),
        history: Arc::new(history),
    };

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {} (expected host:port)", config.server.bind))?;

    let mode = match config.reply.mode {
        ReplyMode::Llm => "llm",
        ReplyMode::Heuristic => "heuristic",
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        %bind,
        mode,
        search = config.search.credentials().is_some(),
        "Starting chat server"
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
