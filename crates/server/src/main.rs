use std::io;

use blogsift_server::{AppContext, Config, app};
use clap::Parser;
use tokio::signal::unix::SignalKind;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy())
        .init();

    info!(?config, "Starting blogsift server");

    let addr = config.socket_addr();
    let router = app(AppContext::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(bind_address = %addr, "HTTP server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    async fn terminate() -> io::Result<()> {
        tokio::signal::unix::signal(SignalKind::terminate())?.recv().await;
        Ok(())
    }
    tokio::select! {
        _ = terminate() => {},
        _ = tokio::signal::ctrl_c() => {},
    }
    info!("Shutdown signal received, starting graceful shutdown")
}
