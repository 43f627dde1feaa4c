//! Login callback and sign-out

use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    response::Response,
};
use courier_core::constants::{ID_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use courier_core::models::Navigation;
use courier_services::{CookieStore, ExchangeOutcome};
use std::sync::Arc;

use crate::cookies::{navigate, request_cookies, with_set_cookies};
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::templates::{render, AuthorizingTemplate};

/// Exchange the authorization code and continue to the upload page.
///
/// A refused exchange leaves the visitor on the "authorizing..." page.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let cookies = request_cookies(&headers, &state.config);

    match state
        .exchange
        .run(query.as_deref().unwrap_or_default(), &cookies)
        .await
    {
        ExchangeOutcome::Complete(navigation) => {
            Ok(with_set_cookies(navigate(&navigation), &cookies))
        }
        ExchangeOutcome::Redirect(navigation) => Ok(navigate(&navigation)),
        ExchangeOutcome::Failed(_) => render(&AuthorizingTemplate),
    }
}

/// Drop the token cookies and end the hosted login session.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let cookies = request_cookies(&headers, &state.config);
    cookies.clear(ID_TOKEN_COOKIE);
    cookies.clear(REFRESH_TOKEN_COOKIE);

    tracing::info!("Signed out");

    let navigation = Navigation::to(state.config.hosted_ui().logout_url());
    with_set_cookies(navigate(&navigation), &cookies)
}
