//! Layer preview HTTP service.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use preview_render::engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve sliced-path layer previews over HTTP.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Path to the planner shared library (defaults to the platform
    /// library search path).
    #[arg(long)]
    engine_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Resolved per request, so a missing engine answers 500 instead
    // of failing startup.
    let binding = engine::LazyNativeBinding::new(args.engine_path);
    let router = preview_server::build_router(Arc::new(binding));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening for preview requests");

    axum::serve(listener, router)
        .await
        .context("server terminated")?;
    Ok(())
}
