use std::sync::Arc;

use anyhow::Result;
use streamhook_core::{Bridge, StreamlabsClient};
use streamhook_ingress::{CorsPolicy, ServiceConfig, build_router};
use streamhook_telemetry::{TelemetryConfig, init_telemetry};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env("streamhook-ingress", env!("CARGO_PKG_VERSION"));
    init_telemetry(telemetry)?;

    let config = ServiceConfig::load()?;
    let client =
        StreamlabsClient::new(config.streamlabs_base_url.clone(), config.upstream_timeout())?;
    info!(
        campaigns = config.campaigns.len(),
        origins = ?config.allowed_origins,
        streamlabs = %client.base_url(),
        "streamhook configuration loaded"
    );

    let bridge = Arc::new(Bridge::new(config.bridge_config(), Arc::new(client)));
    let app = build_router(bridge, CorsPolicy::new(config.allowed_origins.clone()));

    let listener = TcpListener::bind(config.bind).await?;
    info!("ingress-raisely listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
