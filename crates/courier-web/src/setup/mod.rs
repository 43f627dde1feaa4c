//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use courier_core::ClientConfig;
use courier_services::{CognitoCredentialProvider, HttpTokenEndpoint, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: ClientConfig) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        site_url = %config.site_url,
        storage_backend = %config.storage_backend,
        "Configuration loaded and validated successfully"
    );

    let hosted_ui = config.hosted_ui();
    let token_endpoint = HttpTokenEndpoint::new(
        hosted_ui.token_endpoint(),
        Duration::from_secs(config.http_timeout_secs),
    )
    .context("Failed to create token endpoint client")?;

    let credentials =
        CognitoCredentialProvider::new(&config.region, config.identity_pool_id.clone()).await;

    let storage = courier_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage")?;

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(token_endpoint),
        Arc::new(credentials),
        storage,
        Arc::new(SystemClock),
    ));

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
