use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::RelayConfig;
use crate::provider::tikwm::TikwmProvider;
use crate::server::handler::RelayServer;

/// Serve the relay on `config.bind_addr` until Ctrl-C.
pub async fn run(config: RelayConfig) -> Result<()> {
    let provider = TikwmProvider::from_config(&config)?;
    info!(
        "relaying to {} timeout={}s",
        provider.base_url(),
        config.upstream_timeout().as_secs()
    );

    let server = RelayServer::bind(&config.bind_addr, Arc::new(provider)).await?;

    tokio::signal::ctrl_c().await?;
    info!("ctrl-c received, shutting down");
    server.shutdown().await;
    Ok(())
}
