use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{AlpacaState, create_app};
use crate::configs::Settings;
use crate::services::DiscoveryResponder;

pub mod app;
pub mod configs;
pub mod errors;
pub mod extractors;
pub mod handles;
pub mod services;

pub async fn run(settings: &Arc<Settings>) -> anyhow::Result<()> {
    let state = AlpacaState::new(settings.clone());
    let registry = state.registry.clone();
    let app = create_app(state);

    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .with_context(|| format!("Invalid server host {}", settings.server.host))?;

    let address = SocketAddr::from((ip_addr, settings.server.port));

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    tracing::info!("listening on {:?}", address);

    let discovery = if settings.discovery.enabled {
        let discovery_addr = SocketAddr::from((ip_addr, settings.discovery.port));
        Some(
            DiscoveryResponder::start(discovery_addr, settings.server.port)
                .await
                .context("Failed to start discovery responder")?,
        )
    } else {
        None
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    registry.halt_all();
    if let Some(discovery) = discovery {
        discovery.stop().await;
    }

    tracing::info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
