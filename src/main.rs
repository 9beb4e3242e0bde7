// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cardata API Server
//!
//! Signs users in with Google and serves vehicle, fuel and repair records.
//! TLS is terminated in front of this process.

use cardata::{
    config::Config,
    services::{GoogleProvider, IdentityBroker},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration (environment, optional secrets file)
    let config = Config::load().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Cardata API");

    // Connect to the relational store; fails fast if unreachable
    let db = cardata::db::connect(&config.database_url, config.query_timeout)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database reachable");

    let provider =
        Arc::new(GoogleProvider::new(&config).expect("Failed to initialize Google provider"));
    let identity_broker = IdentityBroker::new(provider, &config);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity_broker,
    });

    // Build router
    let app = cardata::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cardata=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
