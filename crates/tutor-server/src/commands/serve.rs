//! The `dover-tutor serve` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use tutor_providers::config::load_config_from;
use tutor_providers::build_service;
use tutor_server::{router, AppState};

pub async fn execute(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = build_service(&config)?;
    let provider = service.provider_name().to_string();
    let app = router(AppState::new(service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, %provider, "server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
}
