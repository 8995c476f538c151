//! btpay service - Braintree payment demo server
//!
//! This is the main entry point for the btpay service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use btpay_service::{create_router, load_env_file, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Env file first so RUST_LOG can come from it
    let env_file = load_env_file()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,btpay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting btpay service");
    if let Some(path) = &env_file {
        tracing::info!(path = %path.display(), "Loaded env file");
    }

    // Load configuration from environment
    let config = ServiceConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        environment = %config.environment,
        merchant_id = ?config.merchant_id,
        merchant_account_id = ?config.merchant_account_id,
        plan_id = %config.plan_id,
        customer_match = %config.customer_match,
        "Service configuration loaded"
    );

    // Build the Braintree client
    let gateway = config.build_gateway()?;
    tracing::info!(endpoint = %gateway.endpoint(), "Braintree client ready");

    // Build app state
    let state = AppState::new(Arc::new(gateway), config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
