//! Gateway server binary.
//!
//! Starts the payment-gateway middleware: the Openpay resource proxy, the
//! webhook receiver with Directus forwarding and the order-notice pipeline.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gateway::{router, AppState, Config, DirectusClient, Mailer, OpenpayClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("gateway_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        openpay_production = config.openpay_production,
        directus_configured = !config.directus_url.is_empty(),
        event_forwarding = config.directus_event_webhook.is_some(),
        charge_forwarding = config.directus_charge_webhook.is_some(),
        smtp_host = %config.smtp_host,
        "config_loaded"
    );

    // Build the external-service clients
    let openpay = OpenpayClient::new(&config)?;
    let directus = DirectusClient::new(&config)?;
    let mailer = Mailer::from_config(&config)?;

    // Create application state and router
    let state = AppState::new(config.clone(), openpay, directus, mailer);
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "gateway_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("gateway_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("gateway_shutting_down");
}
