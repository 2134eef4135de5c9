#![warn(clippy::nursery, clippy::pedantic)]

use std::sync::Arc;

use anyhow::Result;
use pastebox_server::store::FileStore;
use pastebox_server::{router, Config, Manager};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let store = FileStore::open(&config.data_dir)?;
    let manager = Arc::new(Manager::new(store));

    info!("listening on {}", config.bind);
    axum::Server::bind(&config.bind)
        .serve(router(manager).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }
}
