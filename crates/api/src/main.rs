use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use storefront_infra::AppConfig;
use storefront_observability::LogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    storefront_observability::init(&LogConfig::new(
        config.log_level.clone(),
        config.log_format.as_deref(),
    ));

    let services = storefront_api::app::services::build_services(&config)?;
    let app = storefront_api::app::build_app(Arc::new(services), config.rate_limit);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
