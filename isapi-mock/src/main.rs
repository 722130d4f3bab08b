//! isapi-mock - simulated ISAPI camera/NVR
//!
//! Serves canned device identity and synthetic recording search results
//! behind a Digest challenge so ISAPI clients can be exercised locally.

use anyhow::{Context, Result};
use clap::Parser;
use isapi_common::api::AuthMode;
use isapi_common::config::MockConfig;
use isapi_mock::api::dispatch::{DEVICE_INFO_PATH, SEARCH_PATH};
use isapi_mock::cli::Args;
use isapi_mock::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = MockConfig::resolve(&args.overrides()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "isapi_mock={0},isapi_common={0},tower_http={0}",
                    config.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ISAPI mock device (isapi-mock) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.source {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using built-in defaults"),
    }

    let state = AppState::new(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;

    print_banner(&config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Startup banner with endpoints and test hints
fn print_banner(config: &MockConfig) {
    info!("==================================================");
    info!("ISAPI mock device listening on http://{}", config.bind_addr());
    info!("Realm: {}, auth mode: {}", config.realm, config.auth_mode);
    match config.auth_mode {
        AuthMode::ShapeOnly => info!("Username/password: any values accepted"),
        AuthMode::FullDigest => info!(
            "Username/password: {} / {}",
            config.username, config.password
        ),
    }
    info!("Supported endpoints:");
    info!("  GET  {} - device information", DEVICE_INFO_PATH);
    info!("  POST {} - recording search", SEARCH_PATH);
    info!(
        "Test with: curl --digest -u {}:{} http://localhost:{}{}",
        config.username, config.password, config.port, DEVICE_INFO_PATH
    );
    info!("Press Ctrl+C to stop");
    info!("==================================================");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
