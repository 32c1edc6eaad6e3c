use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::http::{AppState, build_router};
use crate::resolver::{PostgresBackend, RequestAdapter};

/// Serves the invocation endpoint until Ctrl+C.
pub async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.server.addr().map_err(anyhow::Error::msg)?;

    let backend = PostgresBackend::from_config(&config.postgres, config.schema.read_mode())
        .await
        .context("configuring database backend")?;
    let backend = Arc::new(backend);
    let adapter = RequestAdapter::new(backend.clone(), config.server.execution_timeout());
    let app = build_router(AppState::new(Arc::new(adapter)));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    backend.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
