//! Page gate: every gated page first passes the authorization check

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use courier_services::GateDecision;
use std::sync::Arc;

use crate::cookies::{navigate, request_cookies};
use crate::state::AppState;

/// Redirects to the hosted login unless a valid identity token is present.
/// Claims of an authorized request are put in the request extensions.
pub async fn gate_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let current_path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let cookies = request_cookies(request.headers(), &state.config);

    match state.gate.check(&current_path, &cookies) {
        GateDecision::Redirect(navigation) => navigate(&navigation),
        GateDecision::Authorized(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        GateDecision::Callback => next.run(request).await,
    }
}
