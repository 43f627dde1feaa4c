//! Route configuration and setup

use crate::handlers;
use crate::middleware::{gate_middleware, security_headers_middleware, SecurityHeadersConfig};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use courier_core::ClientConfig;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &ClientConfig, state: Arc<AppState>) -> Router<()> {
    let body_limit = config.max_upload_size_bytes + FORM_OVERHEAD_BYTES;

    // Public routes: the callback must be reachable without a token
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(&config.callback_path, get(handlers::auth::callback))
        .route("/logout", get(handlers::auth::logout));

    // Gated pages
    let gated_routes = Router::new()
        .route("/", get(handlers::home::home))
        .route(
            &config.upload_path,
            get(handlers::upload::upload_form).post(handlers::upload::upload_submit),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            gate_middleware,
        ));

    let security_headers = Arc::new(SecurityHeadersConfig::new(
        config.hosted_ui().base_url(),
        config.is_production(),
    ));

    tracing::info!(
        http_concurrency_limit = config.http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    public_routes
        .merge(gated_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            security_headers,
            security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
