use axum::{extract::State, response::Response, Extension};
use courier_core::models::TokenClaims;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::templates::{render, HomeTemplate};

pub async fn home(
    State(state): State<Arc<AppState>>,
    claims: Option<Extension<TokenClaims>>,
) -> Result<Response, HttpAppError> {
    render(&HomeTemplate {
        upload_path: state.config.upload_path.clone(),
        email: claims.and_then(|Extension(claims)| claims.email().map(String::from)),
    })
}
