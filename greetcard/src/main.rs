use std::sync::Arc;

use tracing::{error, info};

use crate::app::{AppContext, app_config::AppConfig};

mod app;
mod common;
mod commonapi;
mod controller;
mod model;
mod request_context;
mod service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::load()?;
    common::loggers::logger::init_logger(&app_config)?;

    let listen = format!("0.0.0.0:{}", app_config.server.port);
    let name = app_config.server.name.clone();
    let ctx = match AppContext::init(app_config).await {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!(error = %e, "app start failed");
            return Err(e);
        }
    };

    let app = controller::build_router(ctx);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!(name = name.as_str(), addr = %listener.local_addr()?, "app start 完成");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
