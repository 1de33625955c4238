use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use star_size::config::Config;
use star_size::server;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let state = config.app_state()?;
    let addr = config.socket_addr()?;
    log::info!("model: {}", state.coefficients);

    let app = server::build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    log::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
