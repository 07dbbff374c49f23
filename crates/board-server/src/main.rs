mod config;

use std::sync::Arc;

use tracing::info;

use board_api::board::Board;
use board_api::router;
use board_api::state::AppStateInner;
use board_db::Database;
use board_gateway::topic::Topic;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "board_server=debug,board_api=debug,board_db=debug,board_gateway=debug,tower_http=debug"
                    .into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Store and topic live for the whole process and are dropped on shutdown
    let db = Database::open(&config.db_path)?;
    let topic = match &config.redis_url {
        Some(url) => Topic::redis(url, config.topic.as_str()).await?,
        None => Topic::local(config.topic.as_str()),
    };

    let state = Arc::new(AppStateInner {
        board: Board::new(db, topic),
        keepalive: config.keepalive,
    });

    let app = router::app(state, &config.static_dir);

    let addr = config.addr()?;
    info!("Message board listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
