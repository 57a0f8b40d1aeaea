//! tunebox-server - audio library and playlist service
//!
//! Resolves configuration, opens the configured storage backend, loads the
//! catalog and playlists, then serves the HTTP API until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tunebox_common::config::RootLayout;
use tunebox_server::config::{Args, ServerConfig};
use tunebox_server::{build_router_with, AppState, RouterOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServerConfig::resolve(&args).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any storage work
    info!(
        "Starting tunebox-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let layout = RootLayout::new(&config.root_folder);
    layout
        .ensure_exists()
        .context("Failed to create root folder")?;
    info!("Root folder: {}", layout.root().display());

    let state = AppState::open(&layout, config.storage)
        .await
        .context("Failed to open storage")?;
    info!(
        "✓ Catalog ready: {} audio records, {} playlists",
        state.catalog.len().await,
        state.playlists.list_all().await.len()
    );

    let options = RouterOptions {
        max_upload_bytes: config.max_upload_bytes,
        static_dir: config.static_dir.clone(),
    };
    let app = build_router_with(state, &options);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tunebox-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
